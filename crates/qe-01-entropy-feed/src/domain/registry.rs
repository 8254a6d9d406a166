//! Registered seismic sources and their public keys

use super::SourceId;
use shared_crypto::Ed25519PublicKey;
use std::collections::HashMap;

/// Public keys of the sources whose records are trusted once signed.
#[derive(Clone, Debug, Default)]
pub struct SourceRegistry {
    sources: HashMap<SourceId, Ed25519PublicKey>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or re-key) a source. Returns the previous key, if any.
    pub fn register(
        &mut self,
        source_id: impl Into<SourceId>,
        key: Ed25519PublicKey,
    ) -> Option<Ed25519PublicKey> {
        self.sources.insert(source_id.into(), key)
    }

    pub fn revoke(&mut self, source_id: &str) -> Option<Ed25519PublicKey> {
        self.sources.remove(source_id)
    }

    pub fn get(&self, source_id: &str) -> Option<&Ed25519PublicKey> {
        self.sources.get(source_id)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl FromIterator<(SourceId, Ed25519PublicKey)> for SourceRegistry {
    fn from_iter<I: IntoIterator<Item = (SourceId, Ed25519PublicKey)>>(iter: I) -> Self {
        Self {
            sources: iter.into_iter().collect(),
        }
    }
}
