//! Quantum State Manager - rotation protocol
//!
//! # Locking
//! - `rotation_lock` serializes rotations. A [`RotationTxn`] holds it from
//!   `begin_rotation` until commit or drop, so epochs have no gaps or
//!   duplicates.
//! - `published` holds the live state, pool and fingerprint history. It is
//!   write-locked only for the instant a prepared rotation is installed, so
//!   readers never wait on a pending rotation.

use crate::domain::{
    estimate_bits, EntropyPool, QuantumConfig, QuantumError, QuantumKeyMaterial, QuantumResult,
    QuantumState, RotationPhase,
};
use crate::metrics;
use crate::ports::QuantumStateApi;
use parking_lot::{Mutex, MutexGuard, RwLock};
use qe_01_entropy_feed::{FoldedRecords, RecordKey, ValidRecord};
use shared_types::{
    short_hex, CallContext, EngineEvent, Epoch, Hash, SystemTimeSource, TimeSource,
};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};


struct Published {
    state: QuantumState,
    pool: EntropyPool,
    history: VecDeque<(Epoch, Hash)>,
}

/// Owns the entropy pool and the rotating key material.
pub struct QuantumStateManager {
    config: QuantumConfig,
    rotation_lock: Mutex<()>,
    published: RwLock<Published>,
    phase: RwLock<RotationPhase>,
    time_source: Arc<dyn TimeSource>,
}

impl QuantumStateManager {
    /// Manager starting at epoch 0.
    pub fn new(config: QuantumConfig) -> Self {
        Self::with_genesis(config, 0)
    }

    /// Manager whose genesis state sits at `genesis_epoch`.
    pub fn with_genesis(config: QuantumConfig, genesis_epoch: Epoch) -> Self {
        let pool = EntropyPool::new();
        let state = QuantumState::genesis(genesis_epoch, pool.mix());
        let mut history = VecDeque::with_capacity(config.history_len.max(1));
        history.push_back((genesis_epoch, state.fingerprint()));

        Self {
            config,
            rotation_lock: Mutex::new(()),
            published: RwLock::new(Published {
                state,
                pool,
                history,
            }),
            phase: RwLock::new(RotationPhase::Stable),
            time_source: Arc::new(SystemTimeSource),
        }
    }

    /// Set custom time source (for testing)
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    pub fn config(&self) -> &QuantumConfig {
        &self.config
    }

    pub fn current_epoch(&self) -> Epoch {
        self.published.read().state.epoch()
    }

    /// Number of records folded so far.
    pub fn pool_len(&self) -> usize {
        self.published.read().pool.len()
    }

    /// Run `f` against the pool, e.g. for duplicate checks during validation.
    pub fn with_pool<R>(&self, f: impl FnOnce(&EntropyPool) -> R) -> R {
        f(&self.published.read().pool)
    }

    /// Take the rotation lock. Blocks while another rotation is in flight.
    pub fn begin_rotation(&self) -> RotationTxn<'_> {
        let guard = self.rotation_lock.lock();
        let from_epoch = self.current_epoch();
        *self.phase.write() = RotationPhase::RotationPending { from_epoch };
        debug!(from_epoch, "Rotation started");

        RotationTxn {
            manager: self,
            _guard: guard,
            finished: false,
        }
    }

    fn set_phase(&self, phase: RotationPhase) {
        *self.phase.write() = phase;
    }

    fn reject(&self, attempted_epoch: Epoch, err: &QuantumError) {
        warn!(
            attempted_epoch,
            reason = err.reason(),
            error = %err,
            "Rotation rejected"
        );
        metrics::record_rotation_rejected(err.reason());
        self.set_phase(RotationPhase::Rejected { attempted_epoch });
    }

    fn prepare_locked(
        &self,
        records: &[ValidRecord],
        now: u64,
    ) -> QuantumResult<PreparedRotation> {
        let published = self.published.read();
        let base_epoch = published.state.epoch();
        let next_epoch = base_epoch
            .checked_add(1)
            .ok_or(QuantumError::EpochRegression {
                current: base_epoch,
                attempted: base_epoch,
            })?;

        if records.len() > self.config.max_records_per_rotation {
            return Err(QuantumError::TooManyRecords {
                count: records.len(),
                max: self.config.max_records_per_rotation,
            });
        }

        let mut batch_keys = HashSet::with_capacity(records.len());
        let mut folds = Vec::with_capacity(records.len());
        for record in records {
            let key = record.key();
            if published.pool.is_folded(key) || !batch_keys.insert(key.clone()) {
                return Err(QuantumError::DuplicateRecord {
                    source_id: key.source_id.clone(),
                    timestamp: key.timestamp,
                });
            }
            folds.push((key.clone(), *record.digest()));
        }

        let pool_mix = published.pool.mix_with(folds.iter().map(|(_, d)| d));
        let record_count = (published.pool.len() + folds.len()) as u64;
        let key_material = QuantumKeyMaterial::derive(pool_mix, record_count, next_epoch);

        let entropy_bits = estimate_bits(
            folds.len(),
            self.config.bits_per_record,
            key_material.key().expose(),
        );
        if entropy_bits < self.config.min_entropy_bits {
            return Err(QuantumError::InsufficientEntropy {
                estimated: entropy_bits,
                required: self.config.min_entropy_bits,
            });
        }

        Ok(PreparedRotation {
            base_epoch,
            state: QuantumState {
                key_material,
                last_rotation: now,
            },
            folds,
            entropy_bits,
        })
    }

    fn commit_locked(&self, prepared: PreparedRotation) -> QuantumResult<QuantumState> {
        let mut published = self.published.write();
        let current = published.state.epoch();

        if prepared.base_epoch != current || prepared.epoch() != current + 1 {
            return Err(QuantumError::EpochRegression {
                current,
                attempted: prepared.epoch(),
            });
        }
        if let Some((key, _)) = prepared
            .folds
            .iter()
            .find(|(key, _)| published.pool.is_folded(key))
        {
            return Err(QuantumError::DuplicateRecord {
                source_id: key.source_id.clone(),
                timestamp: key.timestamp,
            });
        }

        for (key, digest) in prepared.folds {
            published.pool.fold(key, digest);
        }
        published.state = prepared.state;

        let epoch = published.state.epoch();
        let fingerprint = published.state.fingerprint();
        published.history.push_back((epoch, fingerprint));
        while published.history.len() > self.config.history_len.max(1) {
            published.history.pop_front();
        }

        metrics::record_rotation_accepted(epoch, published.pool.len());
        info!(
            epoch,
            records = published.pool.len(),
            entropy_bits = prepared.entropy_bits,
            fingerprint = %short_hex(&fingerprint),
            "Quantum state rotated"
        );

        Ok(published.state.clone())
    }
}

impl QuantumStateApi for QuantumStateManager {
    fn current_state(&self) -> QuantumState {
        self.published.read().state.clone()
    }

    fn propose_rotation(
        &self,
        ctx: &CallContext,
        records: Vec<ValidRecord>,
    ) -> QuantumResult<QuantumState> {
        ctx.require_write()?;

        let mut txn = self.begin_rotation();
        let attempted_epoch = txn.from_epoch().saturating_add(1);
        let now = self.time_source.now();

        let result = txn.prepare(&records, now).and_then(|prepared| {
            let event = prepared.accepted_event();
            txn.commit(prepared).map(|state| (state, event))
        });

        match result {
            Ok((state, event)) => {
                ctx.emit(event);
                Ok(state)
            }
            Err(err) => {
                ctx.emit(EngineEvent::RotationRejected {
                    attempted_epoch,
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn fingerprint_at(&self, epoch: Epoch) -> Option<Hash> {
        self.published
            .read()
            .history
            .iter()
            .find(|(e, _)| *e == epoch)
            .map(|(_, fp)| *fp)
    }

    fn phase(&self) -> RotationPhase {
        *self.phase.read()
    }
}

/// Candidate next state computed without mutating the manager.
#[derive(Debug)]
pub struct PreparedRotation {
    base_epoch: Epoch,
    state: QuantumState,
    folds: Vec<(RecordKey, Hash)>,
    entropy_bits: u32,
}

impl PreparedRotation {
    pub fn epoch(&self) -> Epoch {
        self.state.epoch()
    }

    /// Epoch the candidate was prepared on.
    pub fn base_epoch(&self) -> Epoch {
        self.base_epoch
    }

    pub fn fingerprint(&self) -> Hash {
        self.state.fingerprint()
    }

    pub fn state(&self) -> &QuantumState {
        &self.state
    }

    pub fn record_count(&self) -> usize {
        self.folds.len()
    }

    pub fn entropy_bits(&self) -> u32 {
        self.entropy_bits
    }

    /// Event to emit once the rotation is committed.
    pub fn accepted_event(&self) -> EngineEvent {
        EngineEvent::RotationAccepted {
            epoch: self.epoch(),
            records: self.folds.len(),
            entropy_bits: self.entropy_bits,
            fingerprint: self.fingerprint(),
        }
    }
}

/// Exclusive rotation in progress.
///
/// Dropping the transaction without committing leaves state and pool
/// untouched.
pub struct RotationTxn<'a> {
    manager: &'a QuantumStateManager,
    _guard: MutexGuard<'a, ()>,
    finished: bool,
}

impl RotationTxn<'_> {
    /// Epoch that was live when the transaction started. Stable for the
    /// transaction's lifetime.
    pub fn from_epoch(&self) -> Epoch {
        self.manager.current_epoch()
    }

    /// Compute the candidate next state. Does not mutate.
    pub fn prepare(
        &mut self,
        records: &[ValidRecord],
        now: u64,
    ) -> QuantumResult<PreparedRotation> {
        let result = self.manager.prepare_locked(records, now);
        if let Err(err) = &result {
            self.manager.reject(self.from_epoch().saturating_add(1), err);
            self.finished = true;
        }
        result
    }

    /// Install a prepared candidate.
    ///
    /// Refuses a candidate whose epoch is not exactly current + 1.
    pub fn commit(mut self, prepared: PreparedRotation) -> QuantumResult<QuantumState> {
        let attempted = prepared.epoch();
        self.finished = true;
        match self.manager.commit_locked(prepared) {
            Ok(state) => {
                self.manager.set_phase(RotationPhase::Rotated {
                    epoch: state.epoch(),
                });
                Ok(state)
            }
            Err(err) => {
                self.manager.reject(attempted, &err);
                Err(err)
            }
        }
    }
}

impl Drop for RotationTxn<'_> {
    fn drop(&mut self) {
        if !self.finished {
            debug!("Rotation abandoned");
            self.manager.set_phase(RotationPhase::Stable);
        }
    }
}
