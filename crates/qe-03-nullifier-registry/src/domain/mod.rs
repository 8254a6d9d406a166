//! Domain layer for the Nullifier Registry

mod error;

pub use error::*;
