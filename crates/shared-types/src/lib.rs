//! # Shared Types Crate
//!
//! Cross-subsystem definitions for the Quantum-Entropy engine.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identifiers used by more than one subsystem
//!   are defined here and nowhere else.
//! - **Explicit Context**: there is no ambient contract storage. Every
//!   mutating operation receives a [`CallContext`] carrying its storage
//!   capability, the reentrancy token and the event log.
//! - **Events as Values**: operations append [`EngineEvent`]s to the call's
//!   [`EventLog`]; the execution context drains them into an [`EventSink`].

pub mod context;
pub mod entities;
pub mod events;
pub mod time;

pub use context::{CallContext, ContextError, ReentrancyToken, StorageAccess};
pub use entities::*;
pub use events::{EngineEvent, EventLog, EventSink, InMemoryEventSink, TransferKind};
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};
