//! Adapters layer
//!
//! - `json_feed`: wire format of the external seismic feed
//! - `static_feed`: in-memory feed for tests and the demo node

mod json_feed;
mod static_feed;

pub use json_feed::{decode_feed_batch, encode_feed_batch, FeedRecordDto};
pub use static_feed::StaticSeismicFeed;
