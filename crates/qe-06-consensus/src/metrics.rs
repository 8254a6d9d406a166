//! # Consensus Metrics
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qe-06-consensus = { path = "...", features = ["metrics"] }
//! ```
//!
//! - `consensus_blocks_finalized_total`
//! - `consensus_blocks_rejected_total{reason}`
//! - `consensus_blocks_timed_out_total`
//! - `consensus_votes_total{outcome}`
//! - `consensus_finalization_latency_seconds`

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref BLOCKS_FINALIZED: IntCounter = register_int_counter!(
        "consensus_blocks_finalized_total",
        "Total number of blocks finalized with a quorum"
    )
    .expect("Failed to create BLOCKS_FINALIZED metric");

    pub static ref BLOCKS_REJECTED: IntCounterVec = register_int_counter_vec!(
        "consensus_blocks_rejected_total",
        "Total number of blocks rejected",
        &["reason"]
    )
    .expect("Failed to create BLOCKS_REJECTED metric");

    pub static ref BLOCKS_TIMED_OUT: IntCounter = register_int_counter!(
        "consensus_blocks_timed_out_total",
        "Total number of proposals whose voting deadline passed"
    )
    .expect("Failed to create BLOCKS_TIMED_OUT metric");

    pub static ref VOTES: IntCounterVec = register_int_counter_vec!(
        "consensus_votes_total",
        "Votes received, by outcome",
        &["outcome"]
    )
    .expect("Failed to create VOTES metric");

    /// Time from proposal to finalization
    pub static ref FINALIZATION_LATENCY: Histogram = register_histogram!(
        "consensus_finalization_latency_seconds",
        "Time from proposal to finalization in seconds",
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .expect("Failed to create FINALIZATION_LATENCY metric");
}

#[cfg(feature = "metrics")]
pub fn record_block_finalized(latency_seconds: f64) {
    BLOCKS_FINALIZED.inc();
    FINALIZATION_LATENCY.observe(latency_seconds);
}

#[cfg(feature = "metrics")]
pub fn record_block_rejected(reason: &str) {
    BLOCKS_REJECTED.with_label_values(&[reason]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_block_timed_out() {
    BLOCKS_TIMED_OUT.inc();
}

#[cfg(feature = "metrics")]
pub fn record_vote(outcome: &str) {
    VOTES.with_label_values(&[outcome]).inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_block_finalized(_latency_seconds: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_block_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_block_timed_out() {}

#[cfg(not(feature = "metrics"))]
pub fn record_vote(_outcome: &str) {}
