//! # Privacy Proof Metrics
//!
//! Enable with the `metrics` feature.
//!
//! - `privacy_proofs_verified_total`
//! - `privacy_proofs_rejected_total{reason}`

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref PROOFS_VERIFIED: IntCounter = register_int_counter!(
        "privacy_proofs_verified_total",
        "Total number of private transfer proofs accepted"
    )
    .expect("Failed to create PROOFS_VERIFIED metric");

    pub static ref PROOFS_REJECTED: IntCounterVec = register_int_counter_vec!(
        "privacy_proofs_rejected_total",
        "Total number of private transfer proofs refused",
        &["reason"]
    )
    .expect("Failed to create PROOFS_REJECTED metric");
}

#[cfg(feature = "metrics")]
pub fn record_verified(count: usize) {
    PROOFS_VERIFIED.inc_by(count as u64);
}

#[cfg(feature = "metrics")]
pub fn record_rejected(reason: &str) {
    PROOFS_REJECTED.with_label_values(&[reason]).inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_verified(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_rejected(_reason: &str) {}
