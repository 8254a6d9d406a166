//! Entropy Feed Validator - record admission checks
//!
//! # Check Order
//! 1. Source authenticity (registered key, signature)
//! 2. Freshness window
//! 3. Physical plausibility
//! 4. Duplicate against the pool's folded records
//!
//! Validation is pure. Folding is performed by the quantum state manager.

use crate::domain::{
    EntropyError, EntropyFeedConfig, EntropyResult, SeismicRecord, SourceId, SourceRegistry,
    ValidRecord,
};
use crate::ports::FoldedRecords;
use parking_lot::RwLock;
use shared_crypto::Ed25519PublicKey;
use shared_types::{SystemTimeSource, TimeSource};
use std::sync::Arc;
use tracing::{debug, warn};

/// Validates untrusted seismic records before they may influence key material.
pub struct EntropyFeedValidator {
    sources: RwLock<SourceRegistry>,
    config: EntropyFeedConfig,
    time_source: Arc<dyn TimeSource>,
}

impl EntropyFeedValidator {
    pub fn new(sources: SourceRegistry, config: EntropyFeedConfig) -> Self {
        Self {
            sources: RwLock::new(sources),
            config,
            time_source: Arc::new(SystemTimeSource),
        }
    }

    /// Set custom time source (for testing)
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    pub fn config(&self) -> &EntropyFeedConfig {
        &self.config
    }

    /// Current time as seen by the validator.
    pub fn now(&self) -> u64 {
        self.time_source.now()
    }

    /// Register or re-key a seismic source.
    pub fn register_source(&self, source_id: impl Into<SourceId>, key: Ed25519PublicKey) {
        let source_id = source_id.into();
        debug!(source = %source_id, "Registering seismic source");
        self.sources.write().register(source_id, key);
    }

    /// Stop trusting a source. Already folded records stay folded.
    pub fn revoke_source(&self, source_id: &str) -> bool {
        self.sources.write().revoke(source_id).is_some()
    }

    /// Validate one record against the folded set.
    pub fn validate(
        &self,
        record: SeismicRecord,
        folded: &dyn FoldedRecords,
    ) -> EntropyResult<ValidRecord> {
        let result = self
            .check_authenticity(&record)
            .and_then(|_| self.check_freshness(&record))
            .and_then(|_| self.check_ranges(&record))
            .and_then(|_| check_duplicate(&record, folded));

        match result {
            Ok(()) => {
                debug!(
                    source = %record.source_id,
                    timestamp = record.timestamp,
                    magnitude = record.magnitude,
                    "Seismic record accepted"
                );
                Ok(ValidRecord::new(record))
            }
            Err(e) => {
                warn!(
                    source = %record.source_id,
                    timestamp = record.timestamp,
                    reason = e.reason(),
                    "Seismic record rejected"
                );
                Err(e)
            }
        }
    }

    /// Validate a batch in arrival order. Records duplicating an earlier
    /// record of the same batch are refused too.
    pub fn validate_batch(
        &self,
        records: Vec<SeismicRecord>,
        folded: &dyn FoldedRecords,
    ) -> EntropyResult<Vec<ValidRecord>> {
        let mut seen = std::collections::HashSet::new();
        let mut accepted = Vec::with_capacity(records.len());

        for record in records {
            let valid = self.validate(record, folded)?;
            if !seen.insert(valid.key().clone()) {
                return Err(EntropyError::Duplicate {
                    source_id: valid.record().source_id.clone(),
                    timestamp: valid.record().timestamp,
                });
            }
            accepted.push(valid);
        }

        Ok(accepted)
    }

    fn check_authenticity(&self, record: &SeismicRecord) -> EntropyResult<()> {
        let sources = self.sources.read();
        let key = sources
            .get(&record.source_id)
            .ok_or_else(|| EntropyError::UnknownSource {
                source_id: record.source_id.clone(),
            })?;

        key.verify(&record.signing_bytes(), &record.signature)
            .map_err(|_| EntropyError::BadSignature {
                source_id: record.source_id.clone(),
            })
    }

    fn check_freshness(&self, record: &SeismicRecord) -> EntropyResult<()> {
        let now = self.time_source.now();
        let latest_allowed = now.saturating_add(self.config.max_future_skew_secs);
        let oldest_allowed = now.saturating_sub(self.config.freshness_window_secs);

        if record.timestamp > latest_allowed {
            return Err(EntropyError::FutureDated {
                timestamp: record.timestamp,
                latest_allowed,
            });
        }
        if record.timestamp < oldest_allowed {
            return Err(EntropyError::Stale {
                timestamp: record.timestamp,
                oldest_allowed,
            });
        }
        Ok(())
    }

    fn check_ranges(&self, record: &SeismicRecord) -> EntropyResult<()> {
        let cfg = &self.config;
        check_range("latitude", record.latitude, -90.0, 90.0)?;
        check_range("longitude", record.longitude, -180.0, 180.0)?;
        check_range("magnitude", record.magnitude, cfg.min_magnitude, cfg.max_magnitude)?;
        check_range("depth_km", record.depth_km, 0.0, cfg.max_depth_km)
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> EntropyResult<()> {
    // NaN fails both comparisons, so test the accepted interval positively
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(EntropyError::OutOfRange { field, value })
    }
}

fn check_duplicate(record: &SeismicRecord, folded: &dyn FoldedRecords) -> EntropyResult<()> {
    if folded.is_folded(&record.key()) {
        return Err(EntropyError::Duplicate {
            source_id: record.source_id.clone(),
            timestamp: record.timestamp,
        });
    }
    Ok(())
}
