//! Domain layer for the Privacy Proof subsystem

mod backend;
mod commitment;
mod config;
mod error;
mod proof;
mod transfer;

pub use backend::*;
pub use commitment::*;
pub use config::*;
pub use error::*;
pub use proof::*;
pub use transfer::*;
