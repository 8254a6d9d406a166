//! Live quantum state

use super::QuantumKeyMaterial;
use shared_types::{Epoch, Hash};

/// Live security context.
///
/// Epoch strictly increases per accepted rotation and is never rolled back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuantumState {
    pub key_material: QuantumKeyMaterial,
    /// Unix seconds of the last accepted rotation (0 at genesis).
    pub last_rotation: u64,
}

impl QuantumState {
    /// State at `epoch` before any record has been folded.
    pub fn genesis(epoch: Epoch, pool_mix: Hash) -> Self {
        Self {
            key_material: QuantumKeyMaterial::derive(pool_mix, 0, epoch),
            last_rotation: 0,
        }
    }

    pub fn epoch(&self) -> Epoch {
        self.key_material.epoch()
    }

    /// Public fingerprint blocks declare for this epoch.
    pub fn fingerprint(&self) -> Hash {
        self.key_material.fingerprint()
    }
}
