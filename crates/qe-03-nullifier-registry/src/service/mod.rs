//! Nullifier Registry - linearizable check-and-insert
//!
//! One mutex guards the store. Every consuming operation checks and inserts
//! under it, so two callers can never both observe a value as fresh.

use crate::domain::{ReplayError, ReplayResult};
use crate::metrics;
use crate::ports::{NullifierRegistryApi, NullifierStore};
use parking_lot::Mutex;
use shared_types::Nullifier;
use std::collections::HashSet;
use tracing::{debug, warn};


pub struct NullifierRegistry<S: NullifierStore> {
    store: Mutex<S>,
}

impl<S: NullifierStore> NullifierRegistry<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Check `nullifiers`, run `apply` while the registry lock is held, and
    /// insert the values only if `apply` succeeds.
    ///
    /// Values are inserted in one atomic store batch. If `apply` fails
    /// nothing is consumed.
    pub fn consume_with<T, E>(
        &self,
        nullifiers: &[Nullifier],
        apply: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<ReplayError>,
    {
        let mut store = self.store.lock();
        check_fresh(&*store, nullifiers)?;

        let output = apply()?;

        store
            .insert_batch(nullifiers)
            .map_err(ReplayError::from)?;
        metrics::record_consumed(nullifiers.len());
        debug!(count = nullifiers.len(), "Nullifiers consumed");
        Ok(output)
    }

    /// Whether every value is fresh. Does not consume.
    pub fn check_all_fresh(&self, nullifiers: &[Nullifier]) -> ReplayResult<()> {
        check_fresh(&*self.store.lock(), nullifiers)
    }
}

fn check_fresh<S: NullifierStore>(store: &S, nullifiers: &[Nullifier]) -> ReplayResult<()> {
    let mut seen = HashSet::with_capacity(nullifiers.len());
    for nullifier in nullifiers {
        if !seen.insert(*nullifier) {
            return Err(ReplayError::DuplicateInBatch(*nullifier));
        }
        if store.contains(nullifier)? {
            warn!(nullifier = %nullifier, "Nullifier replay refused");
            metrics::record_replay_attempt();
            return Err(ReplayError::AlreadyUsed(*nullifier));
        }
    }
    Ok(())
}

impl<S: NullifierStore> NullifierRegistryApi for NullifierRegistry<S> {
    fn try_consume(&self, nullifier: Nullifier) -> ReplayResult<()> {
        self.try_consume_all(&[nullifier])
    }

    fn try_consume_all(&self, nullifiers: &[Nullifier]) -> ReplayResult<()> {
        self.consume_with(nullifiers, || Ok::<_, ReplayError>(()))
    }

    fn is_consumed(&self, nullifier: &Nullifier) -> ReplayResult<bool> {
        Ok(self.store.lock().contains(nullifier)?)
    }

    fn consumed_count(&self) -> ReplayResult<u64> {
        Ok(self.store.lock().len()?)
    }
}
