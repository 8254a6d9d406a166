//! # Call Context
//!
//! Replaces ambient contract storage. A `CallContext` is created by the
//! execution context for one external call and passed by reference into
//! every operation the call performs.
//!
//! - **Storage capability**: read-only contexts may simulate but never mutate.
//! - **Reentrancy token**: ledger-mutating operations take the token for the
//!   duration of the operation. A nested attempt on the same context fails.
//!   The token is released when dropped, so every exit path releases it.
//! - **Event log**: operations append events; the caller drains them.

use crate::entities::Epoch;
use crate::events::{EngineEvent, EventLog};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Storage capability granted to a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageAccess {
    ReadOnly,
    ReadWrite,
}

/// Errors raised by context checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("operation requires write access but the call context is read-only")]
    ReadOnly,

    #[error("nested entry into a ledger-mutating operation")]
    Reentrant,
}

/// Per-call execution context.
#[derive(Debug)]
pub struct CallContext {
    access: StorageAccess,
    live_epoch: Option<Epoch>,
    entered: AtomicBool,
    events: Mutex<EventLog>,
}

impl CallContext {
    /// Context allowed to mutate state.
    pub fn read_write() -> Self {
        Self::new(StorageAccess::ReadWrite)
    }

    /// Context restricted to reads and simulations.
    pub fn read_only() -> Self {
        Self::new(StorageAccess::ReadOnly)
    }

    fn new(access: StorageAccess) -> Self {
        Self {
            access,
            live_epoch: None,
            entered: AtomicBool::new(false),
            events: Mutex::new(EventLog::new()),
        }
    }

    /// Attach the quantum epoch observed when the call started.
    pub fn with_live_epoch(mut self, epoch: Epoch) -> Self {
        self.live_epoch = Some(epoch);
        self
    }

    pub fn access(&self) -> StorageAccess {
        self.access
    }

    pub fn live_epoch(&self) -> Option<Epoch> {
        self.live_epoch
    }

    /// Fail unless this call may write.
    pub fn require_write(&self) -> Result<(), ContextError> {
        match self.access {
            StorageAccess::ReadWrite => Ok(()),
            StorageAccess::ReadOnly => Err(ContextError::ReadOnly),
        }
    }

    /// Take the reentrancy token. Released when the returned value drops.
    pub fn enter(&self) -> Result<ReentrancyToken<'_>, ContextError> {
        self.entered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ContextError::Reentrant)?;
        Ok(ReentrancyToken {
            flag: &self.entered,
        })
    }

    /// Whether a ledger-mutating operation currently holds the token.
    pub fn is_entered(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }

    /// Append an event to the call's log.
    pub fn emit(&self, event: EngineEvent) {
        self.events.lock().push(event);
    }

    /// Snapshot of events emitted so far.
    pub fn events(&self) -> EventLog {
        self.events.lock().clone()
    }

    /// Drain the log, leaving it empty.
    pub fn take_events(&self) -> EventLog {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn into_events(self) -> EventLog {
        self.events.into_inner()
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::read_write()
    }
}

/// Proof that the holder is the only active ledger-mutating operation of
/// its call context.
#[derive(Debug)]
pub struct ReentrancyToken<'a> {
    flag: &'a AtomicBool,
}

impl Drop for ReentrancyToken<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
