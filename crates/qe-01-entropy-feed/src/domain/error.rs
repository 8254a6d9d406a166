//! Error types for the Entropy Feed subsystem

use super::SourceId;
use thiserror::Error;

/// Reasons a seismic record is refused.
///
/// All variants are input-validation failures: never retried automatically.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntropyError {
    #[error("Unknown seismic source: {source_id}")]
    UnknownSource { source_id: SourceId },

    #[error("Bad signature from seismic source: {source_id}")]
    BadSignature { source_id: SourceId },

    #[error("Stale record: timestamp {timestamp} older than {oldest_allowed}")]
    Stale { timestamp: u64, oldest_allowed: u64 },

    #[error("Future-dated record: timestamp {timestamp} later than {latest_allowed}")]
    FutureDated { timestamp: u64, latest_allowed: u64 },

    #[error("Field {field} out of physical range: {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("Duplicate record from {source_id} at {timestamp}")]
    Duplicate { source_id: SourceId, timestamp: u64 },
}

impl EntropyError {
    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            EntropyError::UnknownSource { .. } => "unknown_source",
            EntropyError::BadSignature { .. } => "bad_signature",
            EntropyError::Stale { .. } => "stale",
            EntropyError::FutureDated { .. } => "future_dated",
            EntropyError::OutOfRange { .. } => "out_of_range",
            EntropyError::Duplicate { .. } => "duplicate",
        }
    }
}

/// Failures fetching records from a remote feed. Transient: the polling
/// orchestration retries these with backoff.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("Seismic feed unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed feed payload: {0}")]
    Malformed(String),
}

/// Result type for entropy feed operations
pub type EntropyResult<T> = Result<T, EntropyError>;
