//! # Engine Events
//!
//! Structured events appended by operations to their call's [`EventLog`].
//! The surrounding execution context drains the log into an [`EventSink`].

use crate::entities::{Address, Epoch, Hash, Nullifier};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Whether a transfer moved public or proof-backed value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferKind {
    Public,
    Private,
}

/// Events emitted by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// Quantum state advanced to `epoch`.
    RotationAccepted {
        epoch: Epoch,
        records: usize,
        entropy_bits: u32,
        fingerprint: Hash,
    },
    /// Rotation to `attempted_epoch` was refused; prior state kept.
    RotationRejected {
        attempted_epoch: Epoch,
        reason: String,
    },
    /// Ledger balances changed.
    TransferApplied {
        kind: TransferKind,
        sender: Address,
        recipient: Address,
        amount: u128,
    },
    /// A proof tried to spend an already consumed nullifier.
    NullifierReplayAttempt { nullifier: Nullifier },
    /// Block committed with a quorum.
    BlockFinalized {
        height: u64,
        block_hash: Hash,
        epoch: Epoch,
        votes: usize,
    },
    /// Block refused before or during commit.
    BlockRejected {
        height: u64,
        block_hash: Hash,
        reason: String,
    },
    /// Voting deadline passed without quorum.
    BlockTimedOut {
        height: u64,
        block_hash: Hash,
        votes: usize,
    },
}

impl EngineEvent {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            EngineEvent::RotationAccepted { .. } => "rotation_accepted",
            EngineEvent::RotationRejected { .. } => "rotation_rejected",
            EngineEvent::TransferApplied { .. } => "transfer_applied",
            EngineEvent::NullifierReplayAttempt { .. } => "nullifier_replay_attempt",
            EngineEvent::BlockFinalized { .. } => "block_finalized",
            EngineEvent::BlockRejected { .. } => "block_rejected",
            EngineEvent::BlockTimedOut { .. } => "block_timed_out",
        }
    }
}

/// Append-only, ordered list of events produced during one call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<EngineEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    /// Move every event of `other` onto the end of this log.
    pub fn extend(&mut self, other: EventLog) {
        self.events.extend(other.events);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EngineEvent> {
        self.events.iter()
    }

    /// Count events with the given label.
    pub fn count(&self, label: &str) -> usize {
        self.events.iter().filter(|e| e.label() == label).count()
    }

    pub fn into_vec(self) -> Vec<EngineEvent> {
        self.events
    }
}

impl IntoIterator for EventLog {
    type Item = EngineEvent;
    type IntoIter = std::vec::IntoIter<EngineEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

/// Consumer of drained event logs (the execution context's emission sink).
pub trait EventSink: Send + Sync {
    fn publish(&self, log: EventLog);
}

/// Event sink that keeps everything in memory. Used by tests and the demo node.
#[derive(Default)]
pub struct InMemoryEventSink {
    events: RwLock<Vec<EngineEvent>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.read().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }
}

impl EventSink for InMemoryEventSink {
    fn publish(&self, log: EventLog) {
        self.events.write().extend(log);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_order_and_count() {
        let mut log = EventLog::new();
        log.push(EngineEvent::NullifierReplayAttempt {
            nullifier: Nullifier::from_bytes([1; 32]),
        });
        log.push(EngineEvent::RotationRejected {
            attempted_epoch: 3,
            reason: "insufficient entropy".into(),
        });

        assert_eq!(log.len(), 2);
        assert_eq!(log.count("nullifier_replay_attempt"), 1);
        let labels: Vec<_> = log.iter().map(|e| e.label()).collect();
        assert_eq!(labels, vec!["nullifier_replay_attempt", "rotation_rejected"]);
    }

    #[test]
    fn test_in_memory_sink() {
        let sink = InMemoryEventSink::new();
        let mut log = EventLog::new();
        log.push(EngineEvent::BlockTimedOut {
            height: 1,
            block_hash: [0; 32],
            votes: 4,
        });
        sink.publish(log);
        assert_eq!(sink.event_count(), 1);
    }
}
