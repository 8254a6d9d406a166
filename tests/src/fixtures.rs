//! Shared setup for the integration scenarios.

use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use node_runtime::container::{EngineConfig, ProofBackendConfig};
use node_runtime::genesis::{GenesisAllocation, GenesisConfig, GenesisSource};
use node_runtime::{EngineContainer, InMemoryEngine};
use qe_01_entropy_feed::{RecordKey, SeismicRecord, ValidRecord};
use qe_02_quantum_state::QuantumStateApi;
use qe_03_nullifier_registry::InMemoryNullifierStore;
use qe_04_privacy_proofs::{prove_transfer, Blinding, SpendSecret, TranscriptBackend, Witness, ZkProof};
use qe_05_ledger::PublicTransfer;
use qe_06_consensus::{
    Block, ConsensusApi, ConsensusProof, ConsensusResult, ProposalId, QuorumRule, Transaction,
    Vote, VoteOutcome,
};
use shared_crypto::Ed25519KeyPair;
use shared_types::{Address, CallContext, Epoch, InMemoryEventSink, ManualTimeSource};

pub const SOURCE: &str = "IU.ANMO";
pub const NOW: u64 = 2_000;
pub const GENESIS_EPOCH: Epoch = 5;
pub const PROOF_KEY: [u8; 32] = [0x42; 32];

pub const ALICE: Address = [0xA1; 20];
pub const BOB: Address = [0xB0; 20];
pub const CAROL: Address = [0xC0; 20];

pub fn source_key() -> Ed25519KeyPair {
    Ed25519KeyPair::from_seed([11u8; 32])
}

pub fn validator_key(index: usize) -> Ed25519KeyPair {
    Ed25519KeyPair::from_seed([index as u8 + 1; 32])
}

/// Signed record from the registered test station.
pub fn record(timestamp: u64, magnitude: f64) -> SeismicRecord {
    SeismicRecord::unsigned(SOURCE, timestamp, 34.95, -106.46, magnitude, 10.0)
        .signed_by(&source_key())
}

pub fn public(from: Address, to: Address, amount: u128, epoch: Epoch) -> Transaction {
    Transaction::Public(PublicTransfer {
        from,
        to,
        amount,
        epoch,
    })
}

/// Private transfer proof. `secret` selects the spend secret, so equal
/// secrets and amounts give equal nullifiers.
pub fn private_proof(
    secret: u8,
    amount: u128,
    sender: Address,
    recipient: Address,
    epoch: Epoch,
) -> ZkProof {
    let witness = Witness {
        amount,
        blinding: Blinding([secret.wrapping_add(1); 32]),
        spend_secret: SpendSecret([secret; 32]),
    };
    prove_transfer(&TranscriptBackend::new(PROOF_KEY), &witness, sender, recipient, epoch)
        .expect("transcript backend proves")
}

/// Builds an in-memory engine with a manual clock.
pub struct EngineBuilder {
    validators: usize,
    quorum: QuorumRule,
    vote_timeout: Duration,
    allocations: Vec<(Address, u128)>,
    tweak: Option<Box<dyn FnOnce(&mut EngineConfig)>>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            validators: 4,
            quorum: QuorumRule::SuperMajority,
            vote_timeout: Duration::from_secs(5),
            allocations: vec![(ALICE, 100), (BOB, 50)],
            tweak: None,
        }
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validators(mut self, count: usize) -> Self {
        self.validators = count;
        self
    }

    pub fn quorum(mut self, quorum: QuorumRule) -> Self {
        self.quorum = quorum;
        self
    }

    pub fn vote_timeout(mut self, timeout: Duration) -> Self {
        self.vote_timeout = timeout;
        self
    }

    pub fn allocations(mut self, allocations: Vec<(Address, u128)>) -> Self {
        self.allocations = allocations;
        self
    }

    /// Last-word edit of the assembled configuration.
    pub fn configure(mut self, f: impl FnOnce(&mut EngineConfig) + 'static) -> Self {
        self.tweak = Some(Box::new(f));
        self
    }

    pub fn config(&mut self) -> EngineConfig {
        let seeds: Vec<[u8; 32]> = (0..self.validators).map(|i| [i as u8 + 1; 32]).collect();

        let mut config = EngineConfig::default();
        config.genesis = GenesisConfig::devnet(&seeds);
        config.genesis.epoch = GENESIS_EPOCH;
        config.genesis.allocations = self
            .allocations
            .iter()
            .map(|(address, amount)| GenesisAllocation {
                address: hex::encode(address),
                amount: *amount,
            })
            .collect();
        config.genesis.sources.push(GenesisSource {
            source_id: SOURCE.into(),
            public_key: hex::encode(source_key().public_key().as_bytes()),
        });
        config.proofs = ProofBackendConfig::Transcript {
            key: hex::encode(PROOF_KEY),
        };
        config.consensus.quorum = self.quorum;
        config.consensus.vote_timeout = self.vote_timeout;

        if let Some(tweak) = self.tweak.take() {
            tweak(&mut config);
        }
        config
    }

    pub fn build(mut self) -> TestEngine {
        let config = self.config();
        let sink = Arc::new(InMemoryEventSink::new());
        let clock = Arc::new(ManualTimeSource::new(NOW));
        let engine = EngineContainer::build(
            config,
            InMemoryNullifierStore::new(),
            sink.clone(),
            clock.clone(),
        )
        .expect("test engine builds");

        TestEngine {
            engine: Arc::new(engine),
            sink,
            clock,
            keys: (0..self.validators).map(validator_key).collect(),
        }
    }
}

/// Assembled engine plus the handles scenarios poke at.
pub struct TestEngine {
    pub engine: Arc<InMemoryEngine>,
    pub sink: Arc<InMemoryEventSink>,
    pub clock: Arc<ManualTimeSource>,
    pub keys: Vec<Ed25519KeyPair>,
}

impl TestEngine {
    pub fn epoch(&self) -> Epoch {
        self.engine.quantum.current_state().epoch()
    }

    /// Validate a record against the live pool.
    pub fn validated(&self, record: SeismicRecord) -> ValidRecord {
        self.engine
            .quantum
            .with_pool(|pool| self.engine.feed.validate(record, pool))
            .expect("record validates")
    }

    /// Validate against nothing; for records that are folded later.
    pub fn validated_fresh(&self, record: SeismicRecord) -> ValidRecord {
        self.engine
            .feed
            .validate(record, &std::collections::HashSet::<RecordKey>::new())
            .expect("record validates")
    }

    /// Next block on top of local state, proposed by validator 0.
    pub fn block(&self, transactions: Vec<Transaction>, entropy: Vec<SeismicRecord>) -> Block {
        let epoch = self.engine.quantum.current_epoch();
        Block {
            height: self.engine.consensus.finalized_height() + 1,
            proposer: *self.keys[0].public_key().as_bytes(),
            epoch,
            quantum_fingerprint: self
                .engine
                .quantum
                .fingerprint_at(epoch)
                .expect("live epoch has a fingerprint"),
            transactions,
            entropy,
        }
    }

    pub async fn propose(&self, block: &Block) -> ConsensusResult<ProposalId> {
        let ctx = CallContext::read_write();
        let result = self.engine.consensus.propose(&ctx, block.clone()).await;
        self.engine.publish(ctx);
        result
    }

    pub async fn vote(&self, id: ProposalId, block: &Block, voters: Range<usize>) -> Vec<VoteOutcome> {
        let mut outcomes = Vec::new();
        for key in &self.keys[voters] {
            let outcome = self
                .engine
                .consensus
                .vote(id, Vote::sign(key, block.hash(), block.height))
                .await
                .expect("vote accepted");
            outcomes.push(outcome);
        }
        outcomes
    }

    pub async fn finalize(&self, id: ProposalId) -> ConsensusResult<ConsensusProof> {
        let ctx = CallContext::read_write();
        let result = self.engine.consensus.try_finalize(&ctx, id).await;
        self.engine.publish(ctx);
        result
    }

    /// Propose, collect votes from `voters`, then finalize.
    pub async fn run_round(
        &self,
        block: &Block,
        voters: Range<usize>,
    ) -> ConsensusResult<ConsensusProof> {
        let id = self.propose(block).await?;
        self.vote(id, block, voters).await;
        self.finalize(id).await
    }

    pub fn event_count(&self, label: &str) -> usize {
        self.sink
            .events()
            .iter()
            .filter(|event| event.label() == label)
            .count()
    }
}
