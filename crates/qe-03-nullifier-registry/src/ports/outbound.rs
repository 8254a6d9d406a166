//! Driven ports (Outbound dependencies)

use crate::domain::StoreError;
use shared_types::Nullifier;

/// Durable set of consumed nullifiers.
///
/// Production: `RocksDbNullifierStore` (feature `rocksdb`)
/// Testing: `InMemoryNullifierStore`
///
/// The registry serializes all access; implementations need no internal
/// locking for correctness.
pub trait NullifierStore: Send + Sync {
    fn contains(&self, nullifier: &Nullifier) -> Result<bool, StoreError>;

    /// Insert every value or none.
    fn insert_batch(&mut self, nullifiers: &[Nullifier]) -> Result<(), StoreError>;

    /// Number of stored values.
    fn len(&self) -> Result<u64, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}
