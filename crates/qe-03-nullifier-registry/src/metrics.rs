//! # Nullifier Registry Metrics
//!
//! Enable with the `metrics` feature.
//!
//! - `nullifiers_consumed_total`
//! - `nullifier_replay_attempts_total`

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, IntCounter};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref NULLIFIERS_CONSUMED: IntCounter = register_int_counter!(
        "nullifiers_consumed_total",
        "Total number of nullifiers consumed"
    )
    .expect("Failed to create NULLIFIERS_CONSUMED metric");

    pub static ref REPLAY_ATTEMPTS: IntCounter = register_int_counter!(
        "nullifier_replay_attempts_total",
        "Total number of refused nullifier replays"
    )
    .expect("Failed to create REPLAY_ATTEMPTS metric");
}

#[cfg(feature = "metrics")]
pub fn record_consumed(count: usize) {
    NULLIFIERS_CONSUMED.inc_by(count as u64);
}

#[cfg(feature = "metrics")]
pub fn record_replay_attempt() {
    REPLAY_ATTEMPTS.inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_consumed(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_replay_attempt() {}
