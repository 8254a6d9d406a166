//! Ports for the Transaction Ledger

pub mod inbound;

pub use inbound::*;
