//! Domain layer for the Consensus Coordinator

mod block;
mod config;
mod error;
mod proof;
mod proposal;
mod validator;
mod vote;

pub use block::*;
pub use config::*;
pub use error::*;
pub use proof::*;
pub use proposal::*;
pub use validator::*;
pub use vote::*;
