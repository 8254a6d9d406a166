//! # Feed Adapters
//!
//! Concrete [`qe_01_entropy_feed::SeismicFeed`] implementations selected by
//! [`crate::container::FeedSource`].

pub mod file_feed;
#[cfg(feature = "http-feed")]
pub mod http_feed;

pub use file_feed::FileSeismicFeed;
#[cfg(feature = "http-feed")]
pub use http_feed::HttpSeismicFeed;

use crate::container::FeedSource;
use qe_01_entropy_feed::SeismicFeed;
use std::sync::Arc;

/// Build the configured feed. `None` when the pump is disabled.
pub fn feed_from_config(source: &FeedSource) -> anyhow::Result<Option<Arc<dyn SeismicFeed>>> {
    match source {
        FeedSource::Disabled => Ok(None),
        FeedSource::File { path } => Ok(Some(Arc::new(FileSeismicFeed::new(path.clone())))),
        #[cfg(feature = "http-feed")]
        FeedSource::Http { url } => Ok(Some(Arc::new(HttpSeismicFeed::new(url.clone())?))),
        #[cfg(not(feature = "http-feed"))]
        FeedSource::Http { url } => anyhow::bail!(
            "seismic feed {url} needs the http-feed feature"
        ),
    }
}
