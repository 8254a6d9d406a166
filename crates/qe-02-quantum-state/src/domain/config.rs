//! Quantum state configuration

use serde::{Deserialize, Serialize};

/// Rotation acceptance thresholds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantumConfig {
    /// Bits credited for each fresh record.
    pub bits_per_record: u32,
    /// Minimum estimated entropy for a rotation to be accepted.
    pub min_entropy_bits: u32,
    /// Upper bound on records folded by one rotation.
    pub max_records_per_rotation: usize,
    /// Number of recent `(epoch, fingerprint)` pairs retained.
    pub history_len: usize,
}

impl Default for QuantumConfig {
    fn default() -> Self {
        Self {
            bits_per_record: 32,
            min_entropy_bits: 32,
            max_records_per_rotation: 256,
            history_len: 64,
        }
    }
}
