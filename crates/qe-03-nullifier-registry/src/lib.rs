//! # qe-03-nullifier-registry
//!
//! Durable set of consumed one-time proof identifiers.
//!
//! ## Guarantees
//!
//! - `try_consume` succeeds at most once per value, even under concurrency
//! - No removal: `AlreadyUsed` is terminal
//! - Batch consumption is all-or-nothing, including duplicates within the batch
//! - `consume_with` couples consumption to a caller's mutation: values are
//!   inserted only if the mutation succeeds
//!
//! ## Storage
//!
//! | Adapter | Use |
//! |---|---|
//! | `InMemoryNullifierStore` | tests, ephemeral nodes |
//! | `RocksDbNullifierStore` | production (feature `rocksdb`) |

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::InMemoryNullifierStore;
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbNullifierConfig, RocksDbNullifierStore};
pub use domain::{ReplayError, ReplayResult, StoreError};
pub use ports::{NullifierRegistryApi, NullifierStore};
pub use service::NullifierRegistry;
