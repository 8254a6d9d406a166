//! # Ledger Metrics
//!
//! Enable with the `metrics` feature.
//!
//! - `ledger_transfers_applied_total{kind}`
//! - `ledger_transfers_rejected_total{reason}`
//! - `ledger_accounts`

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter_vec, register_int_gauge, IntCounterVec, IntGauge};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref TRANSFERS_APPLIED: IntCounterVec = register_int_counter_vec!(
        "ledger_transfers_applied_total",
        "Total number of transfers committed to the ledger",
        &["kind"]
    )
    .expect("Failed to create TRANSFERS_APPLIED metric");

    pub static ref TRANSFERS_REJECTED: IntCounterVec = register_int_counter_vec!(
        "ledger_transfers_rejected_total",
        "Total number of transfers refused by the ledger",
        &["reason"]
    )
    .expect("Failed to create TRANSFERS_REJECTED metric");

    pub static ref ACCOUNTS: IntGauge = register_int_gauge!(
        "ledger_accounts",
        "Number of accounts holding a non-zero balance"
    )
    .expect("Failed to create ACCOUNTS metric");
}

#[cfg(feature = "metrics")]
pub fn record_applied(kind: &str, accounts: usize) {
    TRANSFERS_APPLIED.with_label_values(&[kind]).inc();
    ACCOUNTS.set(accounts as i64);
}

#[cfg(feature = "metrics")]
pub fn record_rejected(reason: &str) {
    TRANSFERS_REJECTED.with_label_values(&[reason]).inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_applied(_kind: &str, _accounts: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_rejected(_reason: &str) {}
