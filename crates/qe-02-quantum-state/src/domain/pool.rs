//! # Entropy Pool
//!
//! Append-only accumulator of accepted seismic record digests.
//!
//! ## Mixing (v1)
//!
//! Digests are folded sequentially in arrival order:
//!
//! ```text
//! mix_0   = Keccak256("qe/pool-mix/v1/genesis")
//! mix_i+1 = Keccak256("qe/pool-mix/v1" || mix_i || digest_i)
//! ```
//!
//! The chain is order sensitive. Records are never reordered or removed.

use qe_01_entropy_feed::{FoldedRecords, RecordKey};
use shared_crypto::KeccakHasher;
use shared_types::Hash;
use std::collections::HashSet;

const MIX_DOMAIN: &str = "qe/pool-mix/v1";
const GENESIS_DOMAIN: &str = "qe/pool-mix/v1/genesis";

/// Mix of an empty pool.
pub fn genesis_mix() -> Hash {
    KeccakHasher::with_domain(GENESIS_DOMAIN).finalize()
}

/// One step of the mixing chain.
pub fn mix_step(mix: &Hash, digest: &Hash) -> Hash {
    let mut hasher = KeccakHasher::with_domain(MIX_DOMAIN);
    hasher.update(mix).update(digest);
    hasher.finalize()
}

/// Accumulated unpredictable material.
#[derive(Clone, Debug)]
pub struct EntropyPool {
    digests: Vec<Hash>,
    folded: HashSet<RecordKey>,
    mix: Hash,
}

impl EntropyPool {
    pub fn new() -> Self {
        Self {
            digests: Vec::new(),
            folded: HashSet::new(),
            mix: genesis_mix(),
        }
    }

    /// Current running mix.
    pub fn mix(&self) -> Hash {
        self.mix
    }

    /// Number of records folded so far.
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    /// Accepted digests in fold order.
    pub fn digests(&self) -> &[Hash] {
        &self.digests
    }

    /// Mix that would result from folding `digests` after the current state.
    pub fn mix_with<'a>(&self, digests: impl IntoIterator<Item = &'a Hash>) -> Hash {
        digests
            .into_iter()
            .fold(self.mix, |mix, digest| mix_step(&mix, digest))
    }

    /// Fold one record. The caller guarantees the key is new.
    pub(crate) fn fold(&mut self, key: RecordKey, digest: Hash) {
        self.mix = mix_step(&self.mix, &digest);
        self.digests.push(digest);
        self.folded.insert(key);
    }
}

impl Default for EntropyPool {
    fn default() -> Self {
        Self::new()
    }
}

impl FoldedRecords for EntropyPool {
    fn is_folded(&self, key: &RecordKey) -> bool {
        self.folded.contains(key)
    }
}

/// Recompute the mix of a digest sequence from genesis.
pub fn replay_mix(digests: &[Hash]) -> Hash {
    digests
        .iter()
        .fold(genesis_mix(), |mix, digest| mix_step(&mix, digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(ts: u64) -> RecordKey {
        RecordKey {
            source_id: "S".into(),
            timestamp: ts,
            latitude_bits: 0,
            longitude_bits: 0,
        }
    }

    #[test]
    fn test_mix_is_order_sensitive() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        let pool = EntropyPool::new();
        assert_ne!(pool.mix_with([&a, &b]), pool.mix_with([&b, &a]));
    }

    #[test]
    fn test_fold_matches_replay() {
        let mut pool = EntropyPool::new();
        pool.fold(key(1), [1u8; 32]);
        pool.fold(key(2), [2u8; 32]);

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.mix(), replay_mix(pool.digests()));
        assert!(pool.is_folded(&key(1)));
        assert!(!pool.is_folded(&key(3)));
    }

    #[test]
    fn test_empty_pool_has_genesis_mix() {
        let pool = EntropyPool::new();
        assert!(pool.is_empty());
        assert_eq!(pool.mix(), genesis_mix());
        assert_eq!(pool.mix_with([]), genesis_mix());
    }
}
