//! Driving ports (Inbound API)

use crate::domain::ReplayResult;
use shared_types::Nullifier;

/// Primary Nullifier Registry API
///
/// Linearizable: for any value, exactly one `try_consume` succeeds over the
/// registry's lifetime. There is no removal.
pub trait NullifierRegistryApi: Send + Sync {
    /// Atomically check and insert.
    fn try_consume(&self, nullifier: Nullifier) -> ReplayResult<()>;

    /// Consume every value or none.
    fn try_consume_all(&self, nullifiers: &[Nullifier]) -> ReplayResult<()>;

    /// Advisory peek. A `false` may be stale by the time the caller acts.
    fn is_consumed(&self, nullifier: &Nullifier) -> ReplayResult<bool>;

    fn consumed_count(&self) -> ReplayResult<u64>;
}
