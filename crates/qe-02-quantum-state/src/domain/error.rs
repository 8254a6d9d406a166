//! Error types for the Quantum State subsystem

use shared_types::{ContextError, Epoch};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantumError {
    #[error("Insufficient entropy: estimated {estimated} bits, required {required}")]
    InsufficientEntropy { estimated: u32, required: u32 },

    #[error("Record from {source_id} at {timestamp} already folded into the pool")]
    DuplicateRecord { source_id: String, timestamp: u64 },

    #[error("Too many records for one rotation: {count} > {max}")]
    TooManyRecords { count: usize, max: usize },

    /// Fatal: an attempt to install an epoch that is not exactly current + 1.
    #[error("Epoch regression: current {current}, attempted {attempted}")]
    EpochRegression { current: Epoch, attempted: Epoch },

    #[error(transparent)]
    Context(#[from] ContextError),
}

impl QuantumError {
    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            QuantumError::InsufficientEntropy { .. } => "insufficient_entropy",
            QuantumError::DuplicateRecord { .. } => "duplicate_record",
            QuantumError::TooManyRecords { .. } => "too_many_records",
            QuantumError::EpochRegression { .. } => "epoch_regression",
            QuantumError::Context(_) => "context",
        }
    }

    /// Invariant violations that must never be retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self, QuantumError::EpochRegression { .. })
    }
}

/// Result type for quantum state operations
pub type QuantumResult<T> = Result<T, QuantumError>;
