//! # Engine Container
//!
//! Holds all subsystem instances and manages their lifecycle.
//!
//! ## Initialization Order
//!
//! Subsystems are built in dependency order:
//!
//! ```text
//! Level 0: Entropy Feed Validator, Quantum State, Nullifier Registry
//! Level 1: Privacy Proof Verifier (registry), Ledger (genesis balances)
//! Level 2: Consensus Coordinator (all of the above + gossip)
//! ```
//!
//! ## Thread Safety
//!
//! - All subsystems wrapped in `Arc` for shared ownership
//! - Each subsystem guards its own state; the container adds no locks

use std::sync::Arc;

use qe_01_entropy_feed::EntropyFeedValidator;
use qe_02_quantum_state::QuantumStateManager;
use qe_03_nullifier_registry::{InMemoryNullifierStore, NullifierRegistry, NullifierStore};
use qe_04_privacy_proofs::PrivacyProofVerifier;
use qe_05_ledger::{LedgerApi, LedgerError, TransactionLedger};
use qe_06_consensus::{
    ConsensusCoordinator, ConsensusDependencies, ConsensusError, InMemoryGossip,
};
use shared_types::{CallContext, EventSink, SystemTimeSource, TimeSource};
use thiserror::Error;
use tracing::info;

use crate::container::config::{ConfigError, EngineConfig};
use crate::container::pending::{PendingEntropy, TransactionQueue};
use crate::genesis::{GenesisBuilder, GenesisError};

/// Gossip channel capacity for the in-process validator network.
const GOSSIP_CAPACITY: usize = 1_024;

/// Failures while assembling the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid genesis: {0}")]
    Genesis(#[from] GenesisError),

    #[error("Genesis ledger refused: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Consensus setup refused: {0}")]
    Consensus(#[from] ConsensusError),

    #[error("Nullifier store unavailable: {0}")]
    Store(String),
}

/// Central container holding all subsystem instances.
pub struct EngineContainer<S: NullifierStore> {
    pub config: EngineConfig,
    pub feed: Arc<EntropyFeedValidator>,
    pub quantum: Arc<QuantumStateManager>,
    pub registry: Arc<NullifierRegistry<S>>,
    pub privacy: Arc<PrivacyProofVerifier<S>>,
    pub ledger: Arc<TransactionLedger>,
    pub gossip: Arc<InMemoryGossip>,
    pub consensus: Arc<ConsensusCoordinator<S, InMemoryGossip>>,
    pub pending_entropy: Arc<PendingEntropy>,
    pub transactions: Arc<TransactionQueue>,
    sink: Arc<dyn EventSink>,
    time_source: Arc<dyn TimeSource>,
}

/// Container backed by the in-memory nullifier store.
pub type InMemoryEngine = EngineContainer<InMemoryNullifierStore>;

impl<S: NullifierStore> EngineContainer<S> {
    /// Build every subsystem from `config` and its genesis.
    pub fn build(
        config: EngineConfig,
        store: S,
        sink: Arc<dyn EventSink>,
        time_source: Arc<dyn TimeSource>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let genesis = GenesisBuilder::new(config.genesis.clone()).build()?;

        // Level 0
        let feed = Arc::new(
            EntropyFeedValidator::new(genesis.sources, config.entropy.clone())
                .with_time_source(Arc::clone(&time_source)),
        );
        let quantum = Arc::new(
            QuantumStateManager::with_genesis(config.quantum.clone(), genesis.epoch)
                .with_time_source(Arc::clone(&time_source)),
        );
        let registry = Arc::new(NullifierRegistry::new(store));

        // Level 1
        let privacy = Arc::new(PrivacyProofVerifier::new(
            Arc::clone(&registry),
            config.proofs.build()?,
            config.privacy.clone(),
        ));
        let ledger = Arc::new(TransactionLedger::with_genesis(
            config.ledger.clone(),
            genesis.allocations,
        )?);

        // Level 2
        let gossip = Arc::new(InMemoryGossip::new(GOSSIP_CAPACITY));
        let consensus = Arc::new(ConsensusCoordinator::new(ConsensusDependencies {
            feed: Arc::clone(&feed),
            quantum: Arc::clone(&quantum),
            privacy: Arc::clone(&privacy),
            ledger: Arc::clone(&ledger),
            gossip: Arc::clone(&gossip),
            validators: genesis.validators,
            config: config.consensus.clone(),
        })?);

        info!(
            epoch = genesis.epoch,
            validators = consensus.validators().len(),
            required_votes = consensus.required_votes(),
            total_supply = %ledger.total_supply(),
            "Engine subsystems initialized"
        );

        Ok(Self {
            pending_entropy: Arc::new(PendingEntropy::new(config.pump.max_pending)),
            transactions: Arc::new(TransactionQueue::new()),
            config,
            feed,
            quantum,
            registry,
            privacy,
            ledger,
            gossip,
            consensus,
            sink,
            time_source,
        })
    }

    /// Drain a finished call's events into the sink.
    pub fn publish(&self, ctx: CallContext) {
        let events = ctx.into_events();
        if !events.is_empty() {
            self.sink.publish(events);
        }
    }

    pub fn sink(&self) -> &Arc<dyn EventSink> {
        &self.sink
    }

    /// Wall clock shared by every subsystem.
    pub fn now(&self) -> u64 {
        self.time_source.now()
    }
}

impl InMemoryEngine {
    /// Engine with an in-memory registry and the system clock.
    pub fn in_memory(config: EngineConfig, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        Self::build(
            config,
            InMemoryNullifierStore::new(),
            sink,
            Arc::new(SystemTimeSource),
        )
    }
}

#[cfg(feature = "rocksdb")]
impl EngineContainer<qe_03_nullifier_registry::RocksDbNullifierStore> {
    /// Engine whose nullifier registry persists under `data_dir`.
    pub fn with_rocksdb(
        config: EngineConfig,
        data_dir: &std::path::Path,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        use qe_03_nullifier_registry::{RocksDbNullifierConfig, RocksDbNullifierStore};

        let store = RocksDbNullifierStore::open(RocksDbNullifierConfig::new(
            data_dir.join("nullifiers"),
        ))
        .map_err(|e| EngineError::Store(e.to_string()))?;
        Self::build(config, store, sink, Arc::new(SystemTimeSource))
    }
}
