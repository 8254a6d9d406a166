//! In-memory nullifier store

use crate::domain::StoreError;
use crate::ports::NullifierStore;
use shared_types::Nullifier;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct InMemoryNullifierStore {
    consumed: HashSet<Nullifier>,
    fail_writes: bool,
}

impl InMemoryNullifierStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `insert_batch` fail (fault injection).
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl NullifierStore for InMemoryNullifierStore {
    fn contains(&self, nullifier: &Nullifier) -> Result<bool, StoreError> {
        Ok(self.consumed.contains(nullifier))
    }

    fn insert_batch(&mut self, nullifiers: &[Nullifier]) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Io {
                message: "injected write failure".into(),
            });
        }
        self.consumed.extend(nullifiers.iter().copied());
        Ok(())
    }

    fn len(&self) -> Result<u64, StoreError> {
        Ok(self.consumed.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injected_failure_inserts_nothing() {
        let mut store = InMemoryNullifierStore::new();
        store.set_fail_writes(true);
        let n = Nullifier([1u8; 32]);

        assert!(store.insert_batch(&[n]).is_err());
        assert!(!store.contains(&n).unwrap());
        assert!(store.is_empty().unwrap());
    }
}
