//! Error types for the Nullifier Registry

use shared_types::Nullifier;
use thiserror::Error;

/// Failures of the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Nullifier store I/O error: {message}")]
    Io { message: String },

    #[error("Nullifier store corrupted: {message}")]
    Corrupted { message: String },
}

/// Consumption failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    /// Terminal: the value can never be consumed again.
    #[error("Nullifier already used: {0}")]
    AlreadyUsed(Nullifier),

    #[error("Nullifier repeated within one batch: {0}")]
    DuplicateInBatch(Nullifier),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ReplayError {
    /// The nullifier involved, if the failure is a replay.
    pub fn nullifier(&self) -> Option<Nullifier> {
        match self {
            ReplayError::AlreadyUsed(n) | ReplayError::DuplicateInBatch(n) => Some(*n),
            ReplayError::Storage(_) => None,
        }
    }
}

/// Result type for registry operations
pub type ReplayResult<T> = Result<T, ReplayError>;
