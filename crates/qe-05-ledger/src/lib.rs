//! # qe-05-ledger
//!
//! Transaction Ledger: account balances mutated only by validated public
//! transfers or verified private transfers.
//!
//! ## Guarantees
//!
//! - A failing transfer changes no balance
//! - The sum of balances equals the genesis supply
//! - Arithmetic is checked; overdrafts and overflows are refused
//! - Read-only contexts may [`simulate`](LedgerApi::simulate) but never mutate
//! - One ledger-mutating operation per call context at a time
//!
//! ## Pipeline
//!
//! ```text
//! Transfer ─→ WriteAccess ─→ QuantumSafe{lag} ─→ overlay ─→ commit
//! ```

pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

pub use domain::{
    AppliedTransfer, CallGuard, LedgerConfig, LedgerError, LedgerResult, Leg, PublicTransfer,
    SimulationFailure, Transfer, TransferIntent, ValidationPipeline,
};
pub use ports::LedgerApi;
pub use service::{LedgerBatch, TransactionLedger};
