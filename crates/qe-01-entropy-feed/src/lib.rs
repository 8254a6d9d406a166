//! # qe-01-entropy-feed
//!
//! Entropy Feed Validator for the Quantum-Entropy engine.
//!
//! ## Role
//!
//! Seismic event feeds are an untrusted source of physical randomness.
//! Before a record may influence key material it must prove:
//!
//! - **Authenticity**: Ed25519 signature by a registered source key
//! - **Freshness**: timestamp inside `[now - window, now + skew]`
//! - **Plausibility**: coordinates, magnitude and depth within physical bounds
//! - **Novelty**: not already folded into the entropy pool
//!
//! ```text
//! SeismicFeed ──records──→ EntropyFeedValidator ──ValidRecord──→ QuantumStateManager (qe-02)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let validator = EntropyFeedValidator::new(sources, EntropyFeedConfig::default());
//! let valid = validator.validate(record, &pool)?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{decode_feed_batch, encode_feed_batch, StaticSeismicFeed};
pub use domain::{
    EntropyError, EntropyFeedConfig, EntropyResult, FeedError, RecordKey, SeismicRecord,
    SourceId, SourceRegistry, ValidRecord,
};
pub use ports::{FoldedRecords, SeismicFeed};
pub use service::EntropyFeedValidator;
