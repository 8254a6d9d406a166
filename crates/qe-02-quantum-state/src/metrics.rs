//! # Quantum State Metrics
//!
//! Enable with the `metrics` feature.
//!
//! - `quantum_rotations_accepted_total`
//! - `quantum_rotations_rejected_total{reason}`
//! - `quantum_current_epoch`
//! - `quantum_pool_records`

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter,
    IntCounterVec, IntGauge,
};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref ROTATIONS_ACCEPTED: IntCounter = register_int_counter!(
        "quantum_rotations_accepted_total",
        "Total number of accepted key rotations"
    )
    .expect("Failed to create ROTATIONS_ACCEPTED metric");

    pub static ref ROTATIONS_REJECTED: IntCounterVec = register_int_counter_vec!(
        "quantum_rotations_rejected_total",
        "Total number of refused key rotations",
        &["reason"]
    )
    .expect("Failed to create ROTATIONS_REJECTED metric");

    pub static ref CURRENT_EPOCH: IntGauge = register_int_gauge!(
        "quantum_current_epoch",
        "Epoch of the live quantum state"
    )
    .expect("Failed to create CURRENT_EPOCH metric");

    pub static ref POOL_RECORDS: IntGauge = register_int_gauge!(
        "quantum_pool_records",
        "Records folded into the entropy pool"
    )
    .expect("Failed to create POOL_RECORDS metric");
}

#[cfg(feature = "metrics")]
pub fn record_rotation_accepted(epoch: u64, pool_records: usize) {
    ROTATIONS_ACCEPTED.inc();
    CURRENT_EPOCH.set(epoch as i64);
    POOL_RECORDS.set(pool_records as i64);
}

#[cfg(feature = "metrics")]
pub fn record_rotation_rejected(reason: &str) {
    ROTATIONS_REJECTED.with_label_values(&[reason]).inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_rotation_accepted(_epoch: u64, _pool_records: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_rotation_rejected(_reason: &str) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_noop_when_disabled() {
        record_rotation_accepted(1, 1);
        record_rotation_rejected("test");
    }
}
