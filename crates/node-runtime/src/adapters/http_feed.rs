//! Seismic feed served over HTTP.
//!
//! `GET <url>?since=<unix seconds>` returning the JSON batch format.

use async_trait::async_trait;
use qe_01_entropy_feed::{decode_feed_batch, FeedError, SeismicFeed, SeismicRecord};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpSeismicFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpSeismicFeed {
    pub fn new(url: impl Into<String>) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl SeismicFeed for HttpSeismicFeed {
    async fn fetch_since(&self, since: u64) -> Result<Vec<SeismicRecord>, FeedError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("since", since)])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;

        let mut records = decode_feed_batch(&body)?;
        records.retain(|r| r.timestamp >= since);
        Ok(records)
    }
}
