//! # Entropy Pump
//!
//! Polls the seismic feed, validates what it returns and either buffers the
//! accepted records for the next block or rotates the quantum state
//! directly.
//!
//! ```text
//! SeismicFeed ──fetch_since(cursor)──→ EntropyFeedValidator ──→ PendingEntropy
//!                                                                   │
//!                          PumpMode::Rotate: propose_rotation ←─────┘
//!                          PumpMode::Block:  BlockProducer takes them
//! ```
//!
//! Fetch failures are transient: the next poll is delayed with exponential
//! backoff, reset by the first successful fetch.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use qe_01_entropy_feed::{EntropyError, SeismicFeed, SeismicRecord, ValidRecord};
use qe_02_quantum_state::{QuantumError, QuantumStateApi};
use qe_03_nullifier_registry::NullifierStore;
use quantum_telemetry::metrics::{FEED_BACKOFF_MS, FEED_POLLS, FEED_POLL_DURATION, FEED_RECORDS};
use quantum_telemetry::{metric_inc, time_histogram};
use shared_types::{CallContext, Epoch};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::container::{EngineContainer, PumpConfig, PumpMode};

/// Exponential retry delay.
#[derive(Debug, Clone)]
pub struct Backoff {
    interval: Duration,
    initial: Duration,
    max: Duration,
    multiplier: u32,
    current: Option<Duration>,
    failures: u32,
}

impl Backoff {
    pub fn new(interval: Duration, initial: Duration, max: Duration, multiplier: u32) -> Self {
        Self {
            interval,
            initial,
            max: max.max(initial),
            multiplier: multiplier.max(1),
            current: None,
            failures: 0,
        }
    }

    pub fn from_config(config: &PumpConfig) -> Self {
        Self::new(
            config.poll_interval(),
            Duration::from_millis(config.initial_backoff_ms),
            Duration::from_millis(config.max_backoff_ms),
            config.backoff_multiplier,
        )
    }

    /// Delay before the next poll.
    pub fn delay(&self) -> Duration {
        self.current.unwrap_or(self.interval)
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Register a failed poll and return the new delay.
    pub fn record_failure(&mut self) -> Duration {
        self.failures = self.failures.saturating_add(1);
        let next = match self.current {
            None => self.initial,
            Some(d) => d.saturating_mul(self.multiplier).min(self.max),
        };
        self.current = Some(next);
        next
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.failures = 0;
    }
}

/// Result of one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The feed answered. `rotated` is the new epoch in rotate mode.
    Fetched {
        accepted: usize,
        rejected: usize,
        rotated: Option<Epoch>,
    },
    /// The feed failed; the next poll waits `retry_in`.
    Failed { reason: String, retry_in: Duration },
}

/// Feed polling loop.
pub struct EntropyPump<S: NullifierStore> {
    engine: Arc<EngineContainer<S>>,
    feed: Arc<dyn SeismicFeed>,
    mode: PumpMode,
    backoff: Backoff,
    cursor: u64,
}

impl<S: NullifierStore> EntropyPump<S> {
    pub fn new(engine: Arc<EngineContainer<S>>, feed: Arc<dyn SeismicFeed>) -> Self {
        let config = &engine.config.pump;
        let mode = config.mode;
        let backoff = Backoff::from_config(config);
        let cursor = engine
            .now()
            .saturating_sub(engine.config.entropy.freshness_window_secs);
        Self {
            engine,
            feed,
            mode,
            backoff,
            cursor,
        }
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Oldest timestamp the next fetch asks for.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Fetch once, admit what validates, rotate in rotate mode.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let fetched = {
            let _timer = time_histogram!(FEED_POLL_DURATION);
            self.feed.fetch_since(self.cursor).await
        };

        let records = match fetched {
            Ok(records) => records,
            Err(err) => {
                let retry_in = self.backoff.record_failure();
                metric_inc!(FEED_POLLS, &["error"]);
                FEED_BACKOFF_MS.set(i64::try_from(retry_in.as_millis()).unwrap_or(i64::MAX));
                warn!(
                    error = %err,
                    failures = self.backoff.failures(),
                    retry_in_ms = retry_in.as_millis() as u64,
                    "Seismic feed fetch failed"
                );
                return PollOutcome::Failed {
                    reason: err.to_string(),
                    retry_in,
                };
            }
        };

        self.backoff.reset();
        FEED_BACKOFF_MS.set(0);
        metric_inc!(
            FEED_POLLS,
            &[if records.is_empty() { "empty" } else { "records" }]
        );

        if let Some(latest) = records.iter().map(|r| r.timestamp).max() {
            self.cursor = self.cursor.max(latest);
        }

        let (accepted, rejected) = self.admit(records);
        let rotated = match self.mode {
            PumpMode::Rotate if !self.engine.pending_entropy.is_empty() => self.rotate(),
            _ => None,
        };

        debug!(
            accepted,
            rejected,
            pending = self.engine.pending_entropy.len(),
            cursor = self.cursor,
            "Seismic feed polled"
        );

        PollOutcome::Fetched {
            accepted,
            rejected,
            rotated,
        }
    }

    /// Poll until `shutdown` flips to true.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(mode = ?self.mode, cursor = self.cursor, "Entropy pump started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            self.poll_once().await;

            tokio::select! {
                _ = tokio::time::sleep(self.backoff.delay()) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        info!("Entropy pump stopped");
    }

    /// Validate `records` against the pool and the pending queue and
    /// enqueue the survivors. Returns (accepted, rejected).
    fn admit(&self, records: Vec<SeismicRecord>) -> (usize, usize) {
        let engine = &self.engine;
        let mut valid = 0usize;
        let mut rejected = 0usize;

        let overflow = engine.quantum.with_pool(|pool| {
            engine.pending_entropy.admit(pool, |seen| {
                let mut batch = HashSet::new();
                let mut accepted: Vec<ValidRecord> = Vec::new();
                for record in records {
                    match engine.feed.validate(record, seen) {
                        Ok(record) => {
                            if batch.insert(record.key().clone()) {
                                accepted.push(record);
                            }
                        }
                        // Feeds repeat records across polls
                        Err(EntropyError::Duplicate { .. }) => {}
                        Err(err) => {
                            rejected += 1;
                            metric_inc!(FEED_RECORDS, &[err.reason()]);
                            warn!(reason = err.reason(), error = %err, "Seismic record refused");
                        }
                    }
                }
                valid = accepted.len();
                accepted
            })
        });

        if !overflow.is_empty() {
            warn!(
                dropped = overflow.len(),
                capacity = engine.config.pump.max_pending,
                "Pending entropy full, records dropped"
            );
            FEED_RECORDS
                .with_label_values(&["backlog_full"])
                .inc_by(overflow.len() as u64);
        }

        let accepted = valid - overflow.len();
        FEED_RECORDS
            .with_label_values(&["accepted"])
            .inc_by(accepted as u64);
        (accepted, rejected + overflow.len())
    }

    /// Fold everything pending into a rotation. Records stay pending while
    /// their entropy is insufficient.
    fn rotate(&self) -> Option<Epoch> {
        let engine = &self.engine;
        let max = engine.config.quantum.max_records_per_rotation;
        let batch = engine
            .quantum
            .with_pool(|pool| engine.pending_entropy.take(max, pool));
        if batch.is_empty() {
            return None;
        }

        let ctx = CallContext::read_write();
        let result = engine.quantum.propose_rotation(&ctx, batch.clone());
        engine.publish(ctx);

        match result {
            Ok(state) => Some(state.epoch()),
            Err(QuantumError::InsufficientEntropy { estimated, required }) => {
                debug!(estimated, required, pending = batch.len(), "Waiting for more entropy");
                engine.pending_entropy.restore(batch);
                None
            }
            Err(err) => {
                warn!(reason = err.reason(), error = %err, "Rotation from feed refused");
                None
            }
        }
    }
}
