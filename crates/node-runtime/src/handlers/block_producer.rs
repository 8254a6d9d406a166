//! # Block Producer
//!
//! Drives one consensus round per tick for the local validator:
//!
//! 1. Drain pending transactions and entropy into a block at the next height
//! 2. `propose` it, then cast the local vote
//! 3. `try_finalize` until quorum or the vote deadline
//!
//! Whatever a failed round took is put back for the next one, minus the
//! entry consensus pointed at as invalid.

use std::sync::Arc;
use std::time::Duration;

use qe_01_entropy_feed::ValidRecord;
use qe_02_quantum_state::QuantumStateApi;
use qe_03_nullifier_registry::NullifierStore;
use qe_06_consensus::{
    Block, ConsensusApi, ConsensusError, ConsensusProof, ConsensusResult, Transaction, Vote,
};
use quantum_telemetry::metrics::{record_error, ROUND_DURATION};
use quantum_telemetry::time_histogram;
use shared_crypto::Ed25519KeyPair;
use shared_types::CallContext;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::container::EngineContainer;

/// Local validator loop.
pub struct BlockProducer<S: NullifierStore> {
    engine: Arc<EngineContainer<S>>,
    keypair: Ed25519KeyPair,
    interval: Duration,
    produce_empty: bool,
}

impl<S: NullifierStore> BlockProducer<S> {
    pub fn new(engine: Arc<EngineContainer<S>>, keypair: Ed25519KeyPair) -> Self {
        let producer = &engine.config.producer;
        let interval = Duration::from_millis(producer.block_interval_ms);
        let produce_empty = producer.produce_empty;
        Self {
            engine,
            keypair,
            interval,
            produce_empty,
        }
    }

    /// Run one round. `Ok(None)` when there was nothing to put in a block.
    pub async fn produce_once(&self) -> ConsensusResult<Option<ConsensusProof>> {
        let engine = &self.engine;
        let transactions = engine
            .transactions
            .take(engine.consensus.config().max_transactions);
        let entropy = engine
            .quantum
            .with_pool(|pool| engine.pending_entropy.take(self.entropy_limit(), pool));

        if transactions.is_empty() && entropy.is_empty() && !self.produce_empty {
            return Ok(None);
        }

        let _timer = time_histogram!(ROUND_DURATION);
        match self.round(transactions.clone(), &entropy).await {
            Ok(proof) => Ok(Some(proof)),
            Err(err) => {
                record_error("consensus", err.reason());
                self.give_back(&err, transactions, entropy);
                Err(err)
            }
        }
    }

    /// Produce on every tick until `shutdown` flips to true.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let validator = self.keypair.public_key();
        info!(
            validator = %hex::encode(&validator.as_bytes()[..8]),
            interval_ms = self.interval.as_millis() as u64,
            "Block producer started"
        );
        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                result = self.produce_once() => match result {
                    Ok(Some(proof)) => debug!(height = proof.height, epoch = proof.epoch, "Round finalized"),
                    Ok(None) => {}
                    Err(err) => warn!(reason = err.reason(), error = %err, "Round failed"),
                },
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        info!("Block producer stopped");
    }

    fn entropy_limit(&self) -> usize {
        self.engine
            .consensus
            .config()
            .max_entropy_records
            .min(self.engine.config.quantum.max_records_per_rotation)
    }

    async fn round(
        &self,
        transactions: Vec<Transaction>,
        entropy: &[ValidRecord],
    ) -> ConsensusResult<ConsensusProof> {
        let engine = &self.engine;
        let epoch = engine.quantum.current_epoch();
        let quantum_fingerprint = engine
            .quantum
            .fingerprint_at(epoch)
            .ok_or(ConsensusError::FingerprintMismatch { epoch })?;

        let block = Block {
            height: engine.consensus.finalized_height() + 1,
            proposer: *self.keypair.public_key().as_bytes(),
            epoch,
            quantum_fingerprint,
            transactions,
            entropy: entropy.iter().map(|r| r.record().clone()).collect(),
        };
        let height = block.height;
        let block_hash = block.hash();

        let ctx = CallContext::read_write();
        let proposed = engine.consensus.propose(&ctx, block).await;
        engine.publish(ctx);
        let proposal_id = proposed?;

        let outcome = engine
            .consensus
            .vote(proposal_id, Vote::sign(&self.keypair, block_hash, height))
            .await?;
        debug!(height, ?outcome, "Local vote cast");

        let ctx = CallContext::read_write();
        let finalized = engine.consensus.try_finalize(&ctx, proposal_id).await;
        engine.publish(ctx);
        finalized
    }

    /// Requeue what a failed round took.
    fn give_back(
        &self,
        err: &ConsensusError,
        mut transactions: Vec<Transaction>,
        mut entropy: Vec<ValidRecord>,
    ) {
        match err {
            ConsensusError::InvalidTransaction { index, reason } if *index < transactions.len() => {
                warn!(index, reason = %reason, "Dropping invalid transaction");
                transactions.remove(*index);
            }
            ConsensusError::InvalidEntropy { index, reason } if *index < entropy.len() => {
                warn!(index, reason = %reason, "Dropping invalid seismic record");
                entropy.remove(*index);
            }
            _ => {}
        }
        self.engine.transactions.restore(transactions);
        self.engine.pending_entropy.restore(entropy);
    }
}
