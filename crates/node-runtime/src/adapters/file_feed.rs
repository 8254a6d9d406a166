//! Seismic feed read from a JSON batch file.
//!
//! The file is re-read on every poll, so an external process can append
//! records by rewriting it.

use async_trait::async_trait;
use qe_01_entropy_feed::{decode_feed_batch, FeedError, SeismicFeed, SeismicRecord};
use std::path::PathBuf;

pub struct FileSeismicFeed {
    path: PathBuf,
}

impl FileSeismicFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SeismicFeed for FileSeismicFeed {
    async fn fetch_since(&self, since: u64) -> Result<Vec<SeismicRecord>, FeedError> {
        let payload = tokio::fs::read(&self.path).await.map_err(|e| {
            FeedError::Unavailable(format!("{}: {e}", self.path.display()))
        })?;
        let mut records = decode_feed_batch(&payload)?;
        records.retain(|r| r.timestamp >= since);
        Ok(records)
    }
}
