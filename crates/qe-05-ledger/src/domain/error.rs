//! Error types for the Transaction Ledger

use shared_types::{short_hex, Address, ContextError, Epoch};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Insufficient balance in {}: required {required}, available {available}", short_hex(.account))]
    InsufficientBalance {
        account: Address,
        required: u128,
        available: u128,
    },

    #[error("Balance overflow in {}", short_hex(.account))]
    Overflow { account: Address },

    #[error("Ledger mutation attempted from a read-only context")]
    ReadOnlyContext,

    #[error("Nested ledger mutation within one call")]
    Reentrancy,

    #[error("Transfer epoch {epoch} is stale: live epoch {live}, lag tolerance {lag}")]
    StaleEpoch { epoch: Epoch, live: Epoch, lag: u64 },

    #[error("Transfer epoch {epoch} is ahead of live epoch {live}")]
    FutureEpoch { epoch: Epoch, live: Epoch },

    #[error("Call context carries no live epoch")]
    NoLiveEpoch,
}

impl LedgerError {
    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            LedgerError::InsufficientBalance { .. } => "insufficient_balance",
            LedgerError::Overflow { .. } => "overflow",
            LedgerError::ReadOnlyContext => "read_only_context",
            LedgerError::Reentrancy => "reentrancy",
            LedgerError::StaleEpoch { .. } => "stale_epoch",
            LedgerError::FutureEpoch { .. } => "future_epoch",
            LedgerError::NoLiveEpoch => "no_live_epoch",
        }
    }
}

impl From<ContextError> for LedgerError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::ReadOnly => LedgerError::ReadOnlyContext,
            ContextError::Reentrant => LedgerError::Reentrancy,
        }
    }
}

/// A simulated intent that would fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Intent {index} would fail: {error}")]
pub struct SimulationFailure {
    pub index: usize,
    pub error: LedgerError,
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
