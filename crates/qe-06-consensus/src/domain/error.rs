//! Error types for the Consensus Coordinator

use super::{ProposalId, ProposalStatus};
use qe_02_quantum_state::QuantumError;
use qe_04_privacy_proofs::ProofError;
use qe_05_ledger::LedgerError;
use shared_types::{short_hex, ContextError, Epoch, ValidatorId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsensusError {
    #[error("Unknown proposer: {}", short_hex(.0))]
    UnknownProposer(ValidatorId),

    #[error("Proposer is not active: {}", short_hex(.0))]
    InactiveProposer(ValidatorId),

    #[error("Invalid block height: expected {expected}, got {actual}")]
    InvalidHeight { expected: u64, actual: u64 },

    #[error("Block epoch {declared} is ahead of live epoch {current}")]
    FutureEpoch { declared: Epoch, current: Epoch },

    #[error("Block epoch {declared} is stale: live epoch {current}, lag tolerance {lag}")]
    StaleEpoch {
        declared: Epoch,
        current: Epoch,
        lag: u64,
    },

    #[error("Quantum fingerprint does not match local history for epoch {epoch}")]
    FingerprintMismatch { epoch: Epoch },

    #[error("Too many transactions: {count} > {limit}")]
    TooManyTransactions { count: usize, limit: usize },

    #[error("Too many entropy records: {count} > {limit}")]
    TooManyEntropyRecords { count: usize, limit: usize },

    #[error("Invalid entropy record {index}: {reason}")]
    InvalidEntropy { index: usize, reason: String },

    #[error("Invalid transaction {index}: {reason}")]
    InvalidTransaction { index: usize, reason: String },

    #[error("Unknown proposal: {0}")]
    UnknownProposal(ProposalId),

    #[error("Unknown or inactive validator: {}", short_hex(.0))]
    UnknownValidator(ValidatorId),

    #[error("Vote signature verification failed for validator: {}", short_hex(.0))]
    InvalidVoteSignature(ValidatorId),

    #[error("Proposal {id} is {status}")]
    ProposalClosed {
        id: ProposalId,
        status: ProposalStatus,
    },

    #[error("Voting deadline passed with {votes} of {required} votes")]
    TimedOut { votes: usize, required: usize },

    #[error("Height {height} is already finalized")]
    DoubleFinalization { height: u64 },

    #[error("Rotation failed: {0}")]
    Rotation(#[from] QuantumError),

    #[error("Proof batch refused: {0}")]
    Proof(#[from] ProofError),

    #[error("Ledger refused block: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Invalid consensus configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed gossip message: {0}")]
    MalformedMessage(String),

    #[error(transparent)]
    Context(#[from] ContextError),
}

impl ConsensusError {
    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            ConsensusError::UnknownProposer(_) => "unknown_proposer",
            ConsensusError::InactiveProposer(_) => "inactive_proposer",
            ConsensusError::InvalidHeight { .. } => "invalid_height",
            ConsensusError::FutureEpoch { .. } => "future_epoch",
            ConsensusError::StaleEpoch { .. } => "stale_epoch",
            ConsensusError::FingerprintMismatch { .. } => "fingerprint_mismatch",
            ConsensusError::TooManyTransactions { .. } => "too_many_transactions",
            ConsensusError::TooManyEntropyRecords { .. } => "too_many_entropy_records",
            ConsensusError::InvalidEntropy { .. } => "invalid_entropy",
            ConsensusError::InvalidTransaction { .. } => "invalid_transaction",
            ConsensusError::UnknownProposal(_) => "unknown_proposal",
            ConsensusError::UnknownValidator(_) => "unknown_validator",
            ConsensusError::InvalidVoteSignature(_) => "invalid_vote_signature",
            ConsensusError::ProposalClosed { .. } => "proposal_closed",
            ConsensusError::TimedOut { .. } => "timed_out",
            ConsensusError::DoubleFinalization { .. } => "double_finalization",
            ConsensusError::Rotation(e) => e.reason(),
            ConsensusError::Proof(e) => e.reason(),
            ConsensusError::Ledger(e) => e.reason(),
            ConsensusError::InvalidConfig(_) => "invalid_config",
            ConsensusError::MalformedMessage(_) => "malformed_message",
            ConsensusError::Context(_) => "context",
        }
    }

    /// Invariant violations. Never retried.
    pub fn is_fatal(&self) -> bool {
        match self {
            ConsensusError::DoubleFinalization { .. } => true,
            ConsensusError::Rotation(e) => e.is_fatal(),
            _ => false,
        }
    }
}

/// Result type for consensus operations
pub type ConsensusResult<T> = Result<T, ConsensusError>;
