//! Error types for the Privacy Proof subsystem

use qe_03_nullifier_registry::ReplayError;
use shared_types::{ContextError, Epoch, Nullifier};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofError {
    #[error("Proof bound to epoch {bound} is stale: live epoch {current}, lag tolerance {lag}")]
    StaleEpoch { bound: Epoch, current: Epoch, lag: u64 },

    #[error("Proof bound to future epoch {bound}: live epoch {current}")]
    FutureEpoch { bound: Epoch, current: Epoch },

    #[error("Invalid proof: {reason}")]
    InvalidProof { reason: &'static str },

    /// Terminal: the nullifier was already consumed.
    #[error("Nullifier replayed: {0}")]
    Replayed(Nullifier),

    #[error("Nullifier repeated within one batch: {0}")]
    DuplicateInBatch(Nullifier),

    #[error("Witness does not satisfy the statement")]
    WitnessMismatch,

    #[error("Backend cannot produce proofs: {0}")]
    ProverUnavailable(&'static str),

    #[error("Nullifier storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Context(#[from] ContextError),
}

impl ProofError {
    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            ProofError::StaleEpoch { .. } => "stale_epoch",
            ProofError::FutureEpoch { .. } => "future_epoch",
            ProofError::InvalidProof { .. } => "invalid_proof",
            ProofError::Replayed(_) => "replayed",
            ProofError::DuplicateInBatch(_) => "duplicate_in_batch",
            ProofError::WitnessMismatch => "witness_mismatch",
            ProofError::ProverUnavailable(_) => "prover_unavailable",
            ProofError::Storage(_) => "storage",
            ProofError::Context(_) => "context",
        }
    }
}

impl From<ReplayError> for ProofError {
    fn from(err: ReplayError) -> Self {
        match err {
            ReplayError::AlreadyUsed(n) => ProofError::Replayed(n),
            ReplayError::DuplicateInBatch(n) => ProofError::DuplicateInBatch(n),
            ReplayError::Storage(e) => ProofError::Storage(e.to_string()),
        }
    }
}

/// Result type for proof operations
pub type ProofResult<T> = Result<T, ProofError>;
