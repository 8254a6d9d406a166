//! Structured logging of engine events.
//!
//! Every [`EngineEvent`] is rendered as one log line with consistent fields
//! so that log queries can filter on them:
//! - `event`: snake_case event label
//! - `epoch`, `height`, `block_hash`, `nullifier`: where the event has them
//! - `reason`: for rejections

use shared_types::{short_hex, EngineEvent, EventLog, EventSink};
use tracing::{info, warn};

use crate::metrics;

/// Log one engine event at the level its kind deserves.
pub fn log_engine_event(service: &str, event: &EngineEvent) {
    let label = event.label();
    match event {
        EngineEvent::RotationAccepted {
            epoch,
            records,
            entropy_bits,
            fingerprint,
        } => info!(
            service,
            event = label,
            epoch,
            records,
            entropy_bits,
            fingerprint = %short_hex(fingerprint),
            "Quantum state rotated"
        ),
        EngineEvent::RotationRejected {
            attempted_epoch,
            reason,
        } => warn!(
            service,
            event = label,
            epoch = attempted_epoch,
            reason = %reason,
            "Rotation rejected"
        ),
        EngineEvent::TransferApplied {
            kind,
            sender,
            recipient,
            amount,
        } => info!(
            service,
            event = label,
            kind = ?kind,
            sender = %short_hex(sender),
            recipient = %short_hex(recipient),
            amount = %amount,
            "Transfer applied"
        ),
        EngineEvent::NullifierReplayAttempt { nullifier } => warn!(
            service,
            event = label,
            nullifier = %nullifier,
            "Nullifier replay attempt"
        ),
        EngineEvent::BlockFinalized {
            height,
            block_hash,
            epoch,
            votes,
        } => info!(
            service,
            event = label,
            height,
            block_hash = %short_hex(block_hash),
            epoch,
            votes,
            "Block finalized"
        ),
        EngineEvent::BlockRejected {
            height,
            block_hash,
            reason,
        } => warn!(
            service,
            event = label,
            height,
            block_hash = %short_hex(block_hash),
            reason = %reason,
            "Block rejected"
        ),
        EngineEvent::BlockTimedOut {
            height,
            block_hash,
            votes,
        } => warn!(
            service,
            event = label,
            height,
            block_hash = %short_hex(block_hash),
            votes,
            "Block timed out"
        ),
    }
}

/// Event sink that turns drained call logs into log lines and counters.
#[derive(Clone, Debug)]
pub struct TracingEventSink {
    service: String,
}

impl TracingEventSink {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

impl EventSink for TracingEventSink {
    fn publish(&self, log: EventLog) {
        for event in log.iter() {
            log_engine_event(&self.service, event);
            metrics::record_event(event);
        }
    }
}

/// Log a message with the engine's standard `subsystem` field.
#[macro_export]
macro_rules! log_event {
    ($level:ident, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a block-related message with height and short hash.
#[macro_export]
macro_rules! log_block_event {
    ($level:ident, $subsystem:expr, $msg:expr, $height:expr, $block_hash:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            height = $height,
            block_hash = %$crate::short_hex(&$block_hash),
            $($($field)*,)?
            $msg
        )
    };
}
