//! Adapters layer
//!
//! - `memory`: in-memory store for tests and ephemeral nodes
//! - `rocksdb_store`: durable store (feature `rocksdb`)

mod memory;
#[cfg(feature = "rocksdb")]
mod rocksdb_store;

pub use memory::InMemoryNullifierStore;
#[cfg(feature = "rocksdb")]
pub use rocksdb_store::{RocksDbNullifierConfig, RocksDbNullifierStore};
