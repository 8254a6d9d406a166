//! Driven ports (Outbound dependencies)

use crate::domain::{FeedError, RecordKey, SeismicRecord};
use async_trait::async_trait;
use std::collections::HashSet;

/// Read-only view of the records already folded into the entropy pool.
///
/// The validator consults it for duplicate detection and never mutates it.
pub trait FoldedRecords {
    fn is_folded(&self, key: &RecordKey) -> bool;
}

impl FoldedRecords for HashSet<RecordKey> {
    fn is_folded(&self, key: &RecordKey) -> bool {
        self.contains(key)
    }
}

/// Remote seismic event feed.
///
/// Endpoint and polling interval are runtime configuration. Delivery may
/// repeat records; duplicates are refused by the validator.
#[async_trait]
pub trait SeismicFeed: Send + Sync {
    /// Fetch records observed at or after `since` (unix seconds).
    async fn fetch_since(&self, since: u64) -> Result<Vec<SeismicRecord>, FeedError>;
}
