//! Domain layer for the Quantum State subsystem
//!
//! - pool: append-only entropy pool and the v1 mixing chain
//! - key: epoch key derivation, fingerprint and derivation proof
//! - entropy: credited-bits estimate capped by Shannon entropy
//! - phase: rotation state machine

mod config;
mod entropy;
mod error;
mod key;
mod phase;
mod pool;
mod state;

pub use config::*;
pub use entropy::*;
pub use error::*;
pub use key::*;
pub use phase::*;
pub use pool::*;
pub use state::*;
