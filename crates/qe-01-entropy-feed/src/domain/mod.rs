//! Domain layer for the Entropy Feed subsystem

mod config;
mod error;
mod record;
mod registry;

pub use config::*;
pub use error::*;
pub use record::*;
pub use registry::*;
