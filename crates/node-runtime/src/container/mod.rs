//! # Engine Container
//!
//! Configuration, the subsystem container with dependency injection, and
//! the buffers feeding block production.

pub mod config;
pub mod pending;
pub mod subsystems;

pub use config::{
    ConfigError, EngineConfig, FeedSource, ProducerConfig, ProofBackendConfig, PumpConfig,
    PumpMode, StorageConfig,
};
pub use pending::{PendingEntropy, TransactionQueue};
pub use subsystems::{EngineContainer, EngineError, InMemoryEngine};
