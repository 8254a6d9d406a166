//! # Node Runtime Library
//!
//! Assembles the engine from configuration and runs its long-lived tasks.
//! The `qe-node` binary is a thin wrapper around [`NodeRuntime`].
//!
//! ## Modules
//!
//! - `container/` - Configuration and the subsystem container
//! - `genesis/` - Genesis description and its typed form
//! - `adapters/` - Seismic feed implementations (file, HTTP)
//! - `handlers/` - Entropy pump and block producer
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (file, then `QE_*` environment overrides)
//! 2. Warn on development keys
//! 3. Initialize subsystems in dependency order
//! 4. Spawn the entropy pump and the block producer
//! 5. Run until Ctrl+C, then signal shutdown

#![allow(clippy::type_complexity)]

pub mod adapters;
pub mod container;
pub mod genesis;
pub mod handlers;
pub mod runtime;

pub use container::{EngineConfig, EngineContainer, EngineError, InMemoryEngine};
pub use genesis::{GenesisBuilder, GenesisConfig};
pub use runtime::NodeRuntime;
