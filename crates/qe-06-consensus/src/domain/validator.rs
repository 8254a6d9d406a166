//! Validator set and quorum rule

use serde::{Deserialize, Serialize};
use shared_crypto::Ed25519PublicKey;
use shared_types::ValidatorId;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorInfo {
    pub public_key: Ed25519PublicKey,
    /// Inactive validators may neither propose nor vote.
    pub active: bool,
}

impl ValidatorInfo {
    pub fn new(public_key: Ed25519PublicKey) -> Self {
        Self {
            public_key,
            active: true,
        }
    }

    pub fn id(&self) -> ValidatorId {
        *self.public_key.as_bytes()
    }
}

/// Ordered validator set. A validator's index is its bit in participation
/// bitmaps.
///
/// Serialized as the plain validator list; the lookup is rebuilt on load.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "Vec<ValidatorInfo>", into = "Vec<ValidatorInfo>")]
pub struct ValidatorSet {
    validators: Vec<ValidatorInfo>,
    /// Quick lookup by validator ID
    lookup: HashMap<ValidatorId, usize>,
}

impl ValidatorSet {
    pub fn new(validators: Vec<ValidatorInfo>) -> Self {
        let mut set = Self {
            validators,
            lookup: HashMap::new(),
        };
        set.rebuild_lookup();
        set
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.validators.iter().filter(|v| v.active).count()
    }

    pub fn contains(&self, id: &ValidatorId) -> bool {
        self.lookup.contains_key(id)
    }

    pub fn index_of(&self, id: &ValidatorId) -> Option<usize> {
        self.lookup.get(id).copied()
    }

    pub fn get(&self, id: &ValidatorId) -> Option<&ValidatorInfo> {
        self.index_of(id).map(|idx| &self.validators[idx])
    }

    /// Active validator by id.
    pub fn active(&self, id: &ValidatorId) -> Option<&ValidatorInfo> {
        self.get(id).filter(|v| v.active)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidatorInfo> {
        self.validators.iter()
    }

    fn rebuild_lookup(&mut self) {
        self.lookup = self
            .validators
            .iter()
            .enumerate()
            .map(|(i, v)| (v.id(), i))
            .collect();
    }
}

impl From<Vec<ValidatorInfo>> for ValidatorSet {
    fn from(validators: Vec<ValidatorInfo>) -> Self {
        Self::new(validators)
    }
}

impl From<ValidatorSet> for Vec<ValidatorInfo> {
    fn from(set: ValidatorSet) -> Self {
        set.validators
    }
}

/// Votes needed to finalize.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuorumRule {
    /// ⌊2n/3⌋ + 1 of the active validators.
    SuperMajority,
    /// Exactly this many votes.
    Fixed(usize),
}

impl QuorumRule {
    pub fn threshold(&self, active: usize) -> usize {
        match self {
            QuorumRule::SuperMajority => active * 2 / 3 + 1,
            QuorumRule::Fixed(n) => *n,
        }
    }
}
