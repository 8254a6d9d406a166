//! Domain layer for the Transaction Ledger

mod balances;
mod config;
mod error;
mod pipeline;
mod transfer;

pub use balances::*;
pub use config::*;
pub use error::*;
pub use pipeline::*;
pub use transfer::*;
