//! Finality evidence
//!
//! A [`ConsensusProof`] lists the quorum votes ordered by validator index,
//! a participation bitmap over the validator set and a Keccak witness
//! binding block hash, height and every signature.

use super::{ProposalId, ValidatorSet, Vote};
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use shared_crypto::KeccakHasher;
use shared_types::{Epoch, Hash};

const WITNESS_DOMAIN: &str = "qe/quorum-witness/v1";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusProof {
    pub proposal_id: ProposalId,
    pub block_hash: Hash,
    pub height: u64,
    /// Quantum epoch after the block committed.
    pub epoch: Epoch,
    pub votes: Vec<Vote>,
    pub participation: BitVec<u8, Lsb0>,
    pub aggregate_witness: Hash,
}

impl ConsensusProof {
    /// Assemble from counted votes. Votes from validators outside `set` are
    /// dropped.
    pub fn assemble(
        proposal_id: ProposalId,
        block_hash: Hash,
        height: u64,
        epoch: Epoch,
        set: &ValidatorSet,
        votes: impl IntoIterator<Item = Vote>,
    ) -> Self {
        let mut indexed: Vec<(usize, Vote)> = votes
            .into_iter()
            .filter_map(|v| set.index_of(&v.validator).map(|i| (i, v)))
            .collect();
        indexed.sort_by_key(|(i, _)| *i);
        indexed.dedup_by_key(|(i, _)| *i);

        let mut participation = bitvec![u8, Lsb0; 0; set.len()];
        for (i, _) in &indexed {
            participation.set(*i, true);
        }
        let votes: Vec<Vote> = indexed.into_iter().map(|(_, v)| v).collect();
        let aggregate_witness = witness(&block_hash, height, &votes);

        Self {
            proposal_id,
            block_hash,
            height,
            epoch,
            votes,
            participation,
            aggregate_witness,
        }
    }

    pub fn participant_count(&self) -> usize {
        self.participation.count_ones()
    }

    /// Check the proof against a validator set and threshold.
    pub fn verify(&self, set: &ValidatorSet, required: usize) -> bool {
        if self.votes.len() < required
            || self.participation.len() != set.len()
            || self.participant_count() != self.votes.len()
        {
            return false;
        }

        let mut last_index = None;
        for vote in &self.votes {
            let Some(index) = set.index_of(&vote.validator) else {
                return false;
            };
            let in_order = last_index.map_or(true, |last| index > last);
            let Some(info) = set.get(&vote.validator) else {
                return false;
            };
            if !in_order
                || !self.participation[index]
                || vote.block_hash != self.block_hash
                || vote.height != self.height
                || !vote.verify(&info.public_key)
            {
                return false;
            }
            last_index = Some(index);
        }

        witness(&self.block_hash, self.height, &self.votes) == self.aggregate_witness
    }
}

fn witness(block_hash: &Hash, height: u64, votes: &[Vote]) -> Hash {
    let mut hasher = KeccakHasher::with_domain(WITNESS_DOMAIN);
    hasher.update(block_hash).update(height.to_le_bytes());
    for vote in votes {
        hasher
            .update(vote.validator)
            .update(vote.signature.as_bytes());
    }
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidatorInfo;
    use shared_crypto::Ed25519KeyPair;

    const HASH: Hash = [3u8; 32];

    fn keys(n: u8) -> Vec<Ed25519KeyPair> {
        (1..=n).map(|i| Ed25519KeyPair::from_seed([i; 32])).collect()
    }

    fn set(keys: &[Ed25519KeyPair]) -> ValidatorSet {
        ValidatorSet::new(
            keys.iter()
                .map(|k| ValidatorInfo::new(k.public_key()))
                .collect(),
        )
    }

    #[test]
    fn test_assembled_proof_verifies() {
        let keys = keys(4);
        let set = set(&keys);
        // Arrival order differs from set order
        let votes = [2, 0, 3].map(|i| Vote::sign(&keys[i], HASH, 9));

        let proof = ConsensusProof::assemble(ProposalId::new(), HASH, 9, 1, &set, votes);

        assert_eq!(proof.participant_count(), 3);
        assert!(!proof.participation[1]);
        assert!(proof.verify(&set, 3));
        assert!(!proof.verify(&set, 4));
    }

    #[test]
    fn test_tampered_proof_fails() {
        let keys = keys(3);
        let set = set(&keys);
        let votes: Vec<Vote> = keys.iter().map(|k| Vote::sign(k, HASH, 1)).collect();
        let proof = ConsensusProof::assemble(ProposalId::new(), HASH, 1, 0, &set, votes);

        let mut forged = proof.clone();
        forged.aggregate_witness = [0u8; 32];
        assert!(!forged.verify(&set, 2));

        let mut dropped = proof.clone();
        dropped.votes.pop();
        assert!(!dropped.verify(&set, 2));

        let mut wrong_height = proof;
        wrong_height.height = 2;
        assert!(!wrong_height.verify(&set, 2));
    }
}
