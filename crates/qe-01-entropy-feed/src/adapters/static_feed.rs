//! In-memory seismic feed

use crate::domain::{FeedError, SeismicRecord};
use crate::ports::SeismicFeed;
use async_trait::async_trait;
use parking_lot::Mutex;

/// Feed backed by a vector of records, with injectable outages.
#[derive(Default)]
pub struct StaticSeismicFeed {
    records: Mutex<Vec<SeismicRecord>>,
    failures_remaining: Mutex<u32>,
}

impl StaticSeismicFeed {
    pub fn new(records: Vec<SeismicRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            failures_remaining: Mutex::new(0),
        }
    }

    pub fn push(&self, record: SeismicRecord) {
        self.records.lock().push(record);
    }

    /// Make the next `count` fetches fail with `FeedError::Unavailable`.
    pub fn fail_next(&self, count: u32) {
        *self.failures_remaining.lock() = count;
    }
}

#[async_trait]
impl SeismicFeed for StaticSeismicFeed {
    async fn fetch_since(&self, since: u64) -> Result<Vec<SeismicRecord>, FeedError> {
        {
            let mut failures = self.failures_remaining.lock();
            if *failures > 0 {
                *failures -= 1;
                return Err(FeedError::Unavailable("injected outage".into()));
            }
        }

        Ok(self
            .records
            .lock()
            .iter()
            .filter(|r| r.timestamp >= since)
            .cloned()
            .collect())
    }
}
