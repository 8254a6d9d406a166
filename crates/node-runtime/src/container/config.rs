//! # Engine Configuration
//!
//! Unified configuration for all subsystems and runtime parameters.
//!
//! Resolution order: defaults, then the optional JSON file, then `QE_*`
//! environment variables. The merged result is validated once.
//!
//! ## Security Requirements
//!
//! - The transcript proof key MUST NOT be the default zero value in production
//! - The development validator key MUST NOT appear in a production genesis

use crate::genesis::{decode_hex_array, GenesisConfig};
use qe_01_entropy_feed::EntropyFeedConfig;
use qe_02_quantum_state::QuantumConfig;
use qe_04_privacy_proofs::{AttestedBackend, PrivacyConfig, ProofBackend, TranscriptBackend};
use qe_05_ledger::LedgerConfig;
use qe_06_consensus::{ConsensusConfig, QuorumRule};
use quantum_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};
use shared_crypto::Ed25519PublicKey;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    #[error("Failed to parse config file: {0}")]
    Parse(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(
        "SECURITY VIOLATION: transcript proof key is the default zero value. \
         Set QE_PROOF_KEY or provide it in the config file."
    )]
    InsecureProofKey,

    #[error("SECURITY VIOLATION: genesis uses the development validator key")]
    DevValidatorKey,
}

/// Proof backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum ProofBackendConfig {
    /// Shared-key transcript backend. `key` is 32 hex-encoded bytes.
    Transcript { key: String },
    /// Attestation backend verifying Ed25519 statements by `verifying_key`.
    Attested { verifying_key: String },
}

impl Default for ProofBackendConfig {
    fn default() -> Self {
        ProofBackendConfig::Transcript {
            key: hex::encode([0u8; 32]),
        }
    }
}

impl ProofBackendConfig {
    pub fn build(&self) -> Result<ProofBackend, ConfigError> {
        match self {
            ProofBackendConfig::Transcript { key } => {
                let key: [u8; 32] =
                    decode_hex_array("proofs.key", key).map_err(invalid("proofs.key"))?;
                Ok(ProofBackend::Transcript(TranscriptBackend::new(key)))
            }
            ProofBackendConfig::Attested { verifying_key } => {
                let bytes: [u8; 32] = decode_hex_array("proofs.verifying_key", verifying_key)
                    .map_err(invalid("proofs.verifying_key"))?;
                let key = Ed25519PublicKey::from_bytes(bytes).map_err(|e| {
                    ConfigError::InvalidValue {
                        key: "proofs.verifying_key".into(),
                        message: e.to_string(),
                    }
                })?;
                Ok(ProofBackend::Attested(AttestedBackend::verifier(key)))
            }
        }
    }

    fn is_zero_key(&self) -> bool {
        match self {
            ProofBackendConfig::Transcript { key } => key
                .trim_start_matches("0x")
                .chars()
                .all(|c| c == '0'),
            ProofBackendConfig::Attested { .. } => false,
        }
    }
}

/// Where the entropy pump takes records from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedSource {
    /// No feed; the pump is not started.
    #[default]
    Disabled,
    /// JSON batch file re-read on every poll.
    File { path: PathBuf },
    /// JSON batch served over HTTP (`http-feed` feature).
    Http { url: String },
}

/// What the pump does with accepted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PumpMode {
    /// Buffer records for the next block; rotation happens at finalization.
    #[default]
    Block,
    /// Rotate the quantum state directly. Single-node deployments only.
    Rotate,
}

/// Entropy pump configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PumpConfig {
    pub feed: FeedSource,
    pub mode: PumpMode,
    /// Delay between successful polls.
    pub poll_interval_ms: u64,
    /// First retry delay after a failed poll.
    pub initial_backoff_ms: u64,
    /// Upper bound of the retry delay.
    pub max_backoff_ms: u64,
    pub backoff_multiplier: u32,
    /// Maximum validated records waiting for a block or rotation.
    pub max_pending: usize,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            feed: FeedSource::Disabled,
            mode: PumpMode::Block,
            poll_interval_ms: 5_000,
            initial_backoff_ms: 1_000,
            max_backoff_ms: 60_000,
            backoff_multiplier: 2,
            max_pending: 1_024,
        }
    }
}

impl PumpConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Block production configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerConfig {
    pub enabled: bool,
    pub block_interval_ms: u64,
    /// Hex-encoded 32-byte seed of the local validator key.
    pub validator_seed: Option<String>,
    /// Produce a block even with nothing to include.
    pub produce_empty: bool,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            block_interval_ms: 2_000,
            validator_seed: None,
            produce_empty: false,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Data directory for the durable nullifier registry (`rocksdb` feature).
    /// In-memory when unset.
    pub data_dir: Option<PathBuf>,
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub telemetry: TelemetryConfig,
    pub entropy: EntropyFeedConfig,
    pub quantum: QuantumConfig,
    pub privacy: PrivacyConfig,
    pub ledger: LedgerConfig,
    pub consensus: ConsensusConfig,
    pub proofs: ProofBackendConfig,
    pub pump: PumpConfig,
    pub producer: ProducerConfig,
    pub storage: StorageConfig,
    pub genesis: GenesisConfig,
}

impl EngineConfig {
    /// Defaults, optional JSON file, then process environment. Validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&raw)
    }

    /// Parse a (possibly partial) JSON document. Missing sections keep
    /// their defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `QE_*` overrides from `lookup`.
    ///
    /// # Environment Variables
    ///
    /// - `QE_LOG_LEVEL` / `RUST_LOG`, `QE_LOG_FORMAT`, `QE_SERVICE_NAME`
    /// - `QE_GENESIS_EPOCH`: Starting epoch
    /// - `QE_QUORUM`: `supermajority` or a fixed vote count
    /// - `QE_VOTE_TIMEOUT_MS`: Voting deadline
    /// - `QE_EPOCH_LAG`: Epoch lag tolerance for proofs, ledger and consensus
    /// - `QE_FRESHNESS_WINDOW_SECS`: Seismic record freshness window
    /// - `QE_MIN_ENTROPY_BITS`: Minimum entropy for a rotation
    /// - `QE_PROOF_KEY`: Transcript backend key (64 hex chars)
    /// - `QE_FEED_FILE` / `QE_FEED_URL`: Seismic feed source
    /// - `QE_PUMP_MODE`: `block` or `rotate`
    /// - `QE_POLL_INTERVAL_MS`, `QE_MAX_BACKOFF_MS`: Pump timing
    /// - `QE_VALIDATOR_SEED`: Local validator seed; enables block production
    /// - `QE_BLOCK_INTERVAL_MS`: Block production interval
    /// - `QE_DATA_DIR`: Durable storage directory
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("QE_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            self.telemetry.log_level = level;
        }
        if let Some(format) = lookup("QE_LOG_FORMAT") {
            self.telemetry.log_format = format.parse().map_err(|e| ConfigError::InvalidValue {
                key: "QE_LOG_FORMAT".into(),
                message: format!("{e}"),
            })?;
        }
        if let Some(name) = lookup("QE_SERVICE_NAME") {
            self.telemetry.service_name = name;
        }

        if let Some(epoch) = parse_var(&lookup, "QE_GENESIS_EPOCH")? {
            self.genesis.epoch = epoch;
        }
        if let Some(raw) = lookup("QE_QUORUM") {
            self.consensus.quorum = parse_quorum(&raw)?;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "QE_VOTE_TIMEOUT_MS")? {
            self.consensus.vote_timeout = Duration::from_millis(ms);
        }
        if let Some(lag) = parse_var(&lookup, "QE_EPOCH_LAG")? {
            self.privacy.epoch_lag_tolerance = lag;
            self.ledger.epoch_lag_tolerance = lag;
            self.consensus.epoch_lag_tolerance = lag;
        }
        if let Some(window) = parse_var(&lookup, "QE_FRESHNESS_WINDOW_SECS")? {
            self.entropy.freshness_window_secs = window;
        }
        if let Some(bits) = parse_var(&lookup, "QE_MIN_ENTROPY_BITS")? {
            self.quantum.min_entropy_bits = bits;
        }
        if let Some(key) = lookup("QE_PROOF_KEY") {
            self.proofs = ProofBackendConfig::Transcript { key };
        }

        if let Some(path) = lookup("QE_FEED_FILE") {
            self.pump.feed = FeedSource::File { path: path.into() };
        }
        if let Some(url) = lookup("QE_FEED_URL") {
            self.pump.feed = FeedSource::Http { url };
        }
        if let Some(mode) = lookup("QE_PUMP_MODE") {
            self.pump.mode = match mode.trim().to_ascii_lowercase().as_str() {
                "block" => PumpMode::Block,
                "rotate" => PumpMode::Rotate,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: "QE_PUMP_MODE".into(),
                        message: format!("expected block or rotate, got '{other}'"),
                    })
                }
            };
        }
        if let Some(ms) = parse_var(&lookup, "QE_POLL_INTERVAL_MS")? {
            self.pump.poll_interval_ms = ms;
        }
        if let Some(ms) = parse_var(&lookup, "QE_MAX_BACKOFF_MS")? {
            self.pump.max_backoff_ms = ms;
        }

        if let Some(seed) = lookup("QE_VALIDATOR_SEED") {
            self.producer.validator_seed = Some(seed);
            self.producer.enabled = true;
        }
        if let Some(ms) = parse_var(&lookup, "QE_BLOCK_INTERVAL_MS")? {
            self.producer.block_interval_ms = ms;
        }
        if let Some(dir) = lookup("QE_DATA_DIR") {
            self.storage.data_dir = Some(dir.into());
        }

        Ok(())
    }

    /// Structural checks. Runs on every load.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.telemetry
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let entropy = &self.entropy;
        if entropy.freshness_window_secs == 0 {
            return Err(ConfigError::Invalid(
                "entropy.freshness_window_secs must be non-zero".into(),
            ));
        }
        if !(entropy.min_magnitude < entropy.max_magnitude) || !(entropy.max_depth_km > 0.0) {
            return Err(ConfigError::Invalid(
                "entropy magnitude/depth bounds are empty".into(),
            ));
        }

        if self.quantum.history_len == 0 || self.quantum.max_records_per_rotation == 0 {
            return Err(ConfigError::Invalid(
                "quantum.history_len and max_records_per_rotation must be non-zero".into(),
            ));
        }

        let lag = self.consensus.epoch_lag_tolerance;
        if self.privacy.epoch_lag_tolerance != lag || self.ledger.epoch_lag_tolerance != lag {
            return Err(ConfigError::Invalid(format!(
                "epoch lag tolerance differs: privacy {}, ledger {}, consensus {}",
                self.privacy.epoch_lag_tolerance, self.ledger.epoch_lag_tolerance, lag
            )));
        }
        if self.consensus.max_transactions == 0 {
            return Err(ConfigError::Invalid(
                "consensus.max_transactions must be non-zero".into(),
            ));
        }
        self.consensus
            .validate(self.genesis.validators.len())
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let pump = &self.pump;
        if pump.poll_interval_ms == 0 || pump.initial_backoff_ms == 0 {
            return Err(ConfigError::Invalid(
                "pump intervals must be non-zero".into(),
            ));
        }
        if pump.max_backoff_ms < pump.initial_backoff_ms || pump.backoff_multiplier == 0 {
            return Err(ConfigError::Invalid(
                "pump backoff must grow from initial_backoff_ms to max_backoff_ms".into(),
            ));
        }
        if pump.max_pending == 0 {
            return Err(ConfigError::Invalid("pump.max_pending must be non-zero".into()));
        }

        if self.producer.block_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "producer.block_interval_ms must be non-zero".into(),
            ));
        }
        if self.producer.enabled {
            let seed = self.producer.validator_seed.as_deref().ok_or_else(|| {
                ConfigError::Invalid("producer enabled without validator_seed".into())
            })?;
            decode_hex_array::<32>("producer.validator_seed", seed)
                .map_err(invalid("producer.validator_seed"))?;
        }

        self.proofs.build().map(|_| ())
    }

    /// Validate configuration for production readiness.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - the transcript proof key is the default zero value
    /// - the genesis lists the development validator
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.proofs.is_zero_key() {
            return Err(ConfigError::InsecureProofKey);
        }
        if self.genesis.uses_dev_validator() {
            return Err(ConfigError::DevValidatorKey);
        }
        Ok(())
    }

    /// Decoded local validator seed, if block production is configured.
    pub fn validator_seed(&self) -> Result<Option<[u8; 32]>, ConfigError> {
        self.producer
            .validator_seed
            .as_deref()
            .map(|seed| {
                decode_hex_array("producer.validator_seed", seed)
                    .map_err(invalid("producer.validator_seed"))
            })
            .transpose()
    }
}

fn invalid<E: std::fmt::Display>(key: &'static str) -> impl Fn(E) -> ConfigError {
    move |e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })
        })
        .transpose()
}

fn parse_quorum(raw: &str) -> Result<QuorumRule, ConfigError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("supermajority") {
        return Ok(QuorumRule::SuperMajority);
    }
    raw.parse()
        .map(QuorumRule::Fixed)
        .map_err(|_| ConfigError::InvalidValue {
            key: "QE_QUORUM".into(),
            message: format!("expected 'supermajority' or a vote count, got '{raw}'"),
        })
}
