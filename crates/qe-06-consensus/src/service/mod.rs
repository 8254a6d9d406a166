//! Consensus Coordinator
//!
//! # Round lifecycle
//! 1. `propose` validates the block against the validator set, the local
//!    quantum history, the entropy feed, proof preflight and a ledger dry
//!    run. Any failure rejects the block before voting.
//! 2. `vote` tallies signed votes per proposal. A validator holds at most
//!    one vote per height among live proposals.
//! 3. `try_finalize` waits for quorum or the deadline. On quorum the
//!    rotation, ledger delta and nullifiers commit together; on timeout the
//!    votes are released so the height can be retried.
//!
//! # Locking
//! `commit_lock` serializes commits. Inside a commit locks are taken in the
//! order rotation → ledger → nullifier registry. `rounds` is never held
//! across an await or a commit.

use crate::adapters::decode_message;
use crate::domain::{
    Block, ConsensusConfig, ConsensusError, ConsensusProof, ConsensusResult, ProposalId,
    ProposalStatus, Transaction, ValidatorSet, Vote, VoteOutcome,
};
use crate::metrics;
use crate::ports::{ConsensusApi, GossipMessage, GossipNetwork};
use async_trait::async_trait;
use parking_lot::Mutex;
use qe_01_entropy_feed::{EntropyFeedValidator, SeismicRecord, ValidRecord};
use qe_02_quantum_state::{QuantumStateApi, QuantumStateManager, RotationTxn};
use qe_03_nullifier_registry::NullifierStore;
use qe_04_privacy_proofs::{PrivacyProofApi, PrivacyProofVerifier, VerifiedTransfer, ZkProof};
use qe_05_ledger::{LedgerApi, LedgerBatch, TransactionLedger, Transfer, TransferIntent};
use shared_types::{short_hex, CallContext, EngineEvent, Epoch, Hash, ValidatorId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};


/// Dependencies for ConsensusCoordinator
pub struct ConsensusDependencies<S: NullifierStore, G: GossipNetwork> {
    pub feed: Arc<EntropyFeedValidator>,
    pub quantum: Arc<QuantumStateManager>,
    pub privacy: Arc<PrivacyProofVerifier<S>>,
    pub ledger: Arc<TransactionLedger>,
    pub gossip: Arc<G>,
    pub validators: ValidatorSet,
    pub config: ConsensusConfig,
}

struct Proposal {
    block: Arc<Block>,
    hash: Hash,
    status: ProposalStatus,
    votes: HashMap<ValidatorId, Vote>,
    /// Tally when the round closed without finalizing.
    closing_tally: usize,
    opened_at: Instant,
    deadline: Instant,
    notify: Arc<Notify>,
    proof: Option<ConsensusProof>,
}

impl Proposal {
    fn height(&self) -> u64 {
        self.block.height
    }
}

#[derive(Default)]
struct Rounds {
    proposals: HashMap<ProposalId, Proposal>,
    live_by_hash: HashMap<Hash, ProposalId>,
    finalized_by_hash: HashMap<Hash, ProposalId>,
    height_votes: HashMap<(u64, ValidatorId), ProposalId>,
    finalized_height: u64,
}

impl Rounds {
    fn existing(&self, hash: &Hash) -> Option<ProposalId> {
        self.live_by_hash
            .get(hash)
            .or_else(|| self.finalized_by_hash.get(hash))
            .copied()
    }

    /// Close a live proposal without finalizing and release its votes.
    fn close(&mut self, id: ProposalId, status: ProposalStatus) -> Option<(u64, Hash, usize)> {
        let proposal = self.proposals.get_mut(&id)?;
        let height = proposal.height();
        let tally = proposal.votes.len();

        proposal.status = status;
        proposal.closing_tally = tally;
        for validator in proposal.votes.keys() {
            self.height_votes.remove(&(height, *validator));
        }
        proposal.votes.clear();
        proposal.notify.notify_waiters();
        self.live_by_hash.remove(&proposal.hash);

        Some((height, proposal.hash, tally))
    }
}

#[derive(Debug)]
enum RoundEntry {
    Opened(ProposalId),
    Known(ProposalId),
}

enum RoundPoll {
    Quorum,
    Waiting {
        notify: Arc<Notify>,
        deadline: Instant,
    },
    Finalized(ConsensusProof),
}

/// Collects validator votes and finalizes blocks.
pub struct ConsensusCoordinator<S: NullifierStore, G: GossipNetwork> {
    feed: Arc<EntropyFeedValidator>,
    quantum: Arc<QuantumStateManager>,
    privacy: Arc<PrivacyProofVerifier<S>>,
    ledger: Arc<TransactionLedger>,
    gossip: Arc<G>,
    validators: ValidatorSet,
    config: ConsensusConfig,
    required: usize,
    rounds: Mutex<Rounds>,
    commit_lock: Mutex<()>,
}

impl<S: NullifierStore, G: GossipNetwork> ConsensusCoordinator<S, G> {
    /// Create a coordinator. Fails if the quorum cannot be reached by the
    /// active validators.
    pub fn new(deps: ConsensusDependencies<S, G>) -> ConsensusResult<Self> {
        let active = deps.validators.active_count();
        deps.config.validate(active)?;
        let required = deps.config.quorum.threshold(active);
        info!(
            validators = deps.validators.len(),
            active,
            required,
            "Consensus coordinator ready"
        );

        Ok(Self {
            feed: deps.feed,
            quantum: deps.quantum,
            privacy: deps.privacy,
            ledger: deps.ledger,
            gossip: deps.gossip,
            validators: deps.validators,
            config: deps.config,
            required,
            rounds: Mutex::new(Rounds::default()),
            commit_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    pub fn validators(&self) -> &ValidatorSet {
        &self.validators
    }

    /// Votes needed to finalize.
    pub fn required_votes(&self) -> usize {
        self.required
    }

    /// Proposals still held in memory, live or recently closed.
    pub fn retained_proposals(&self) -> usize {
        self.rounds.lock().proposals.len()
    }

    /// Live votes for a proposal.
    pub fn tally(&self, proposal_id: ProposalId) -> usize {
        self.rounds
            .lock()
            .proposals
            .get(&proposal_id)
            .map_or(0, |p| p.votes.len())
    }

    /// Handle wire bytes from the validator network.
    ///
    /// Votes are matched to the local live proposal carrying their block
    /// hash; votes for unknown blocks are dropped. Received votes are not
    /// re-broadcast.
    pub async fn receive(&self, ctx: &CallContext, bytes: &[u8]) -> ConsensusResult<()> {
        let message =
            decode_message(bytes).map_err(|e| ConsensusError::MalformedMessage(e.to_string()))?;

        match message {
            GossipMessage::Proposal { block, .. } => self.propose(ctx, block).await.map(|_| ()),
            GossipMessage::Vote { vote, .. } => {
                let live = self.rounds.lock().live_by_hash.get(&vote.block_hash).copied();
                match live {
                    Some(id) => {
                        let outcome = self.count_vote(id, &vote)?;
                        metrics::record_vote(outcome.as_str());
                        Ok(())
                    }
                    None => {
                        debug!(
                            block_hash = %short_hex(&vote.block_hash),
                            "Vote for unknown block dropped"
                        );
                        Ok(())
                    }
                }
            }
        }
    }

    // === VALIDATION ===

    fn check_epoch(&self, declared: Epoch, current: Epoch) -> ConsensusResult<()> {
        let lag = self.config.epoch_lag_tolerance;
        if declared > current {
            return Err(ConsensusError::FutureEpoch { declared, current });
        }
        if declared.saturating_add(lag) < current {
            return Err(ConsensusError::StaleEpoch {
                declared,
                current,
                lag,
            });
        }
        Ok(())
    }

    fn validate_block(&self, block: &Block) -> ConsensusResult<()> {
        let proposer = self
            .validators
            .get(&block.proposer)
            .ok_or(ConsensusError::UnknownProposer(block.proposer))?;
        if !proposer.active {
            return Err(ConsensusError::InactiveProposer(block.proposer));
        }

        let expected = self.finalized_height() + 1;
        if block.height != expected {
            return Err(ConsensusError::InvalidHeight {
                expected,
                actual: block.height,
            });
        }

        let current = self.quantum.current_epoch();
        self.check_epoch(block.epoch, current)?;
        if self.quantum.fingerprint_at(block.epoch) != Some(block.quantum_fingerprint) {
            return Err(ConsensusError::FingerprintMismatch { epoch: block.epoch });
        }

        if block.transactions.len() > self.config.max_transactions {
            return Err(ConsensusError::TooManyTransactions {
                count: block.transactions.len(),
                limit: self.config.max_transactions,
            });
        }
        if block.entropy.len() > self.config.max_entropy_records {
            return Err(ConsensusError::TooManyEntropyRecords {
                count: block.entropy.len(),
                limit: self.config.max_entropy_records,
            });
        }

        self.validate_entropy(&block.entropy)?;
        self.validate_transactions(block, current)?;
        debug!(height = block.height, epoch = block.epoch, "Block passed validation");
        Ok(())
    }

    fn validate_entropy(&self, records: &[SeismicRecord]) -> ConsensusResult<Vec<ValidRecord>> {
        let mut seen = HashSet::with_capacity(records.len());
        self.quantum.with_pool(|pool| {
            records
                .iter()
                .enumerate()
                .map(|(index, record)| {
                    let valid = self.feed.validate(record.clone(), pool).map_err(|e| {
                        ConsensusError::InvalidEntropy {
                            index,
                            reason: e.to_string(),
                        }
                    })?;
                    if !seen.insert(valid.key().clone()) {
                        return Err(ConsensusError::InvalidEntropy {
                            index,
                            reason: "record repeated within block".into(),
                        });
                    }
                    Ok(valid)
                })
                .collect()
        })
    }

    /// Epoch ordering, proof preflight against the block epoch and a ledger
    /// dry run, in block order.
    fn validate_transactions(&self, block: &Block, current: Epoch) -> ConsensusResult<()> {
        let mut nullifiers = HashSet::new();
        let mut intents = Vec::with_capacity(block.transactions.len());

        for (index, tx) in block.transactions.iter().enumerate() {
            if tx.epoch() < block.epoch {
                return Err(ConsensusError::InvalidTransaction {
                    index,
                    reason: format!(
                        "transaction epoch {} precedes block epoch {}",
                        tx.epoch(),
                        block.epoch
                    ),
                });
            }
            let intent = match tx {
                Transaction::Public(t) => TransferIntent::Public(*t),
                Transaction::Private(proof) => {
                    let pending = self.privacy.preflight(proof, block.epoch).map_err(|e| {
                        ConsensusError::InvalidTransaction {
                            index,
                            reason: e.to_string(),
                        }
                    })?;
                    if !nullifiers.insert(pending.nullifier) {
                        return Err(ConsensusError::InvalidTransaction {
                            index,
                            reason: format!("nullifier {} repeated within block", pending.nullifier),
                        });
                    }
                    TransferIntent::Private(pending)
                }
            };
            intents.push(intent);
        }

        let dry_run = CallContext::read_only().with_live_epoch(current);
        self.ledger
            .simulate(&dry_run, &intents)
            .map(|_| ())
            .map_err(|failure| ConsensusError::InvalidTransaction {
                index: failure.index,
                reason: failure.error.to_string(),
            })
    }

    fn reject(&self, ctx: &CallContext, height: u64, block_hash: Hash, err: &ConsensusError) {
        warn!(
            height,
            block_hash = %short_hex(&block_hash),
            reason = err.reason(),
            error = %err,
            "Block rejected"
        );
        metrics::record_block_rejected(err.reason());
        ctx.emit(EngineEvent::BlockRejected {
            height,
            block_hash,
            reason: err.to_string(),
        });
    }

    /// Register a validated block as a live proposal. The height is checked
    /// again under the lock since another block may have finalized since
    /// validation.
    fn open_round(&self, hash: Hash, block: &Arc<Block>) -> ConsensusResult<RoundEntry> {
        let mut rounds = self.rounds.lock();
        if let Some(existing) = rounds.existing(&hash) {
            return Ok(RoundEntry::Known(existing));
        }
        let expected = rounds.finalized_height + 1;
        if block.height != expected {
            return Err(ConsensusError::InvalidHeight {
                expected,
                actual: block.height,
            });
        }

        let id = ProposalId::new();
        let now = Instant::now();
        rounds.live_by_hash.insert(hash, id);
        rounds.proposals.insert(
            id,
            Proposal {
                block: Arc::clone(block),
                hash,
                status: ProposalStatus::Proposed,
                votes: HashMap::new(),
                closing_tally: 0,
                opened_at: now,
                deadline: now + self.config.vote_timeout,
                notify: Arc::new(Notify::new()),
                proof: None,
            },
        );
        Ok(RoundEntry::Opened(id))
    }

    // === VOTING ===

    fn count_vote(&self, proposal_id: ProposalId, vote: &Vote) -> ConsensusResult<VoteOutcome> {
        let info = self
            .validators
            .active(&vote.validator)
            .ok_or(ConsensusError::UnknownValidator(vote.validator))?;
        if !vote.verify(&info.public_key) {
            warn!(
                validator = %short_hex(&vote.validator),
                proposal_id = %proposal_id,
                "Vote signature rejected"
            );
            return Err(ConsensusError::InvalidVoteSignature(vote.validator));
        }

        let mut guard = self.rounds.lock();
        let rounds = &mut *guard;
        let proposal = rounds
            .proposals
            .get_mut(&proposal_id)
            .ok_or(ConsensusError::UnknownProposal(proposal_id))?;

        if !proposal.status.is_live() {
            return Ok(VoteOutcome::Late);
        }
        if vote.block_hash != proposal.hash || vote.height != proposal.height() {
            return Ok(VoteOutcome::Ignored);
        }
        if proposal.votes.contains_key(&vote.validator) {
            return Ok(VoteOutcome::Duplicate);
        }
        let slot = (vote.height, vote.validator);
        if let Some(other) = rounds.height_votes.get(&slot) {
            if *other != proposal_id {
                warn!(
                    validator = %short_hex(&vote.validator),
                    height = vote.height,
                    "Validator already voted for another proposal at this height"
                );
                return Ok(VoteOutcome::Ignored);
            }
        }

        rounds.height_votes.insert(slot, proposal_id);
        proposal.votes.insert(vote.validator, vote.clone());
        proposal.status = ProposalStatus::Voting;

        let votes = proposal.votes.len();
        if votes >= self.required {
            proposal.notify.notify_waiters();
        }
        debug!(
            proposal_id = %proposal_id,
            height = vote.height,
            votes,
            required = self.required,
            "Vote counted"
        );
        Ok(VoteOutcome::Counted {
            votes,
            required: self.required,
        })
    }

    // === FINALIZATION ===

    fn poll_round(&self, proposal_id: ProposalId) -> ConsensusResult<RoundPoll> {
        let rounds = self.rounds.lock();
        let proposal = rounds
            .proposals
            .get(&proposal_id)
            .ok_or(ConsensusError::UnknownProposal(proposal_id))?;

        match proposal.status {
            ProposalStatus::Finalized => proposal
                .proof
                .clone()
                .map(RoundPoll::Finalized)
                .ok_or(ConsensusError::ProposalClosed {
                    id: proposal_id,
                    status: proposal.status,
                }),
            ProposalStatus::TimedOut => Err(ConsensusError::TimedOut {
                votes: proposal.closing_tally,
                required: self.required,
            }),
            ProposalStatus::Rejected => Err(ConsensusError::ProposalClosed {
                id: proposal_id,
                status: proposal.status,
            }),
            ProposalStatus::Proposed | ProposalStatus::Voting => {
                if proposal.votes.len() >= self.required {
                    Ok(RoundPoll::Quorum)
                } else {
                    Ok(RoundPoll::Waiting {
                        notify: Arc::clone(&proposal.notify),
                        deadline: proposal.deadline,
                    })
                }
            }
        }
    }

    /// Time out a live proposal still short of quorum. `None` if the round
    /// changed in the meantime.
    fn expire(&self, ctx: &CallContext, proposal_id: ProposalId) -> Option<ConsensusError> {
        let mut rounds = self.rounds.lock();
        let proposal = rounds.proposals.get(&proposal_id)?;
        if !proposal.status.is_live() || proposal.votes.len() >= self.required {
            return None;
        }

        let (height, block_hash, votes) = rounds.close(proposal_id, ProposalStatus::TimedOut)?;
        drop(rounds);

        warn!(
            proposal_id = %proposal_id,
            height,
            votes,
            required = self.required,
            "Voting deadline passed"
        );
        metrics::record_block_timed_out();
        ctx.emit(EngineEvent::BlockTimedOut {
            height,
            block_hash,
            votes,
        });
        Some(ConsensusError::TimedOut {
            votes,
            required: self.required,
        })
    }

    fn finalize(&self, ctx: &CallContext, proposal_id: ProposalId) -> ConsensusResult<ConsensusProof> {
        let _commit = self.commit_lock.lock();

        let (block, opened_at) = {
            let rounds = self.rounds.lock();
            let proposal = rounds
                .proposals
                .get(&proposal_id)
                .ok_or(ConsensusError::UnknownProposal(proposal_id))?;
            match proposal.status {
                ProposalStatus::Finalized => {
                    if let Some(proof) = &proposal.proof {
                        return Ok(proof.clone());
                    }
                }
                status if !status.is_live() => {
                    return Err(ConsensusError::ProposalClosed {
                        id: proposal_id,
                        status,
                    })
                }
                _ => {}
            }
            if proposal.height() <= rounds.finalized_height {
                error!(height = proposal.height(), "Refusing second finalization of height");
                return Err(ConsensusError::DoubleFinalization {
                    height: proposal.height(),
                });
            }
            (Arc::clone(&proposal.block), proposal.opened_at)
        };

        let block_hash = block.hash();
        match self.commit_block(ctx, &block) {
            Ok(epoch) => Ok(self.record_finalized(ctx, proposal_id, &block, epoch, opened_at)),
            Err(err) => {
                if err.is_fatal() {
                    error!(height = block.height, error = %err, "Commit hit an invariant violation");
                }
                self.rounds.lock().close(proposal_id, ProposalStatus::Rejected);
                self.reject(ctx, block.height, block_hash, &err);
                Err(err)
            }
        }
    }

    fn record_finalized(
        &self,
        ctx: &CallContext,
        proposal_id: ProposalId,
        block: &Block,
        epoch: Epoch,
        opened_at: Instant,
    ) -> ConsensusProof {
        let height = block.height;
        let mut guard = self.rounds.lock();
        let rounds = &mut *guard;

        let proof = match rounds.proposals.get_mut(&proposal_id) {
            Some(proposal) => {
                let proof = ConsensusProof::assemble(
                    proposal_id,
                    proposal.hash,
                    height,
                    epoch,
                    &self.validators,
                    proposal.votes.values().cloned(),
                );
                proposal.status = ProposalStatus::Finalized;
                proposal.proof = Some(proof.clone());
                proposal.notify.notify_waiters();
                rounds.live_by_hash.remove(&proposal.hash);
                rounds.finalized_by_hash.insert(proposal.hash, proposal_id);
                proof
            }
            None => ConsensusProof::assemble(proposal_id, block.hash(), height, epoch, &self.validators, []),
        };
        rounds.finalized_height = height;

        // Competing proposals at this height can no longer finalize
        let superseded: Vec<ProposalId> = rounds
            .proposals
            .iter()
            .filter(|(_, p)| p.status.is_live() && p.height() <= height)
            .map(|(id, _)| *id)
            .collect();
        for id in superseded {
            rounds.close(id, ProposalStatus::Rejected);
        }
        rounds.height_votes.retain(|(h, _), _| *h > height);
        let horizon = height.saturating_sub(self.config.finalized_retention);
        rounds.proposals.retain(|_, p| {
            p.status.is_live()
                || p.height() >= height
                || (p.status == ProposalStatus::Finalized && p.height() > horizon)
        });
        let proposals = &rounds.proposals;
        rounds
            .finalized_by_hash
            .retain(|_, id| proposals.contains_key(id));
        drop(guard);

        let votes = proof.votes.len();
        metrics::record_block_finalized(opened_at.elapsed().as_secs_f64());
        info!(
            proposal_id = %proposal_id,
            height,
            epoch,
            votes,
            block_hash = %short_hex(&proof.block_hash),
            "Block finalized"
        );
        ctx.emit(EngineEvent::BlockFinalized {
            height,
            block_hash: proof.block_hash,
            epoch,
            votes,
        });
        proof
    }

    /// Commit rotation, ledger delta and nullifiers together. Returns the
    /// epoch after the commit.
    fn commit_block(&self, ctx: &CallContext, block: &Block) -> ConsensusResult<Epoch> {
        let txn = self.quantum.begin_rotation();
        let current = txn.from_epoch();
        let inner = CallContext::read_write().with_live_epoch(current);

        let result = self.apply_block(&inner, txn, current, block);
        for event in inner.take_events().into_vec() {
            ctx.emit(event);
        }
        result
    }

    fn apply_block(
        &self,
        inner: &CallContext,
        mut txn: RotationTxn<'_>,
        current: Epoch,
        block: &Block,
    ) -> ConsensusResult<Epoch> {
        self.check_epoch(block.epoch, current)?;

        let prepared = if block.entropy.is_empty() {
            None
        } else {
            let records = self.validate_entropy(&block.entropy)?;
            Some(txn.prepare(&records, self.feed.now())?)
        };

        let proofs: Vec<ZkProof> = block.proofs().cloned().collect();
        let mut batch = self.ledger.begin_batch(inner)?;
        self.privacy
            .verify_batch_with(inner, &proofs, current, |verified| {
                stage_transactions(&mut batch, &block.transactions, verified)
            })?;

        let epoch = match prepared {
            Some(prepared) => {
                let event = prepared.accepted_event();
                let state = txn.commit(prepared)?;
                inner.emit(event);
                state.epoch()
            }
            None => current,
        };
        batch.commit();
        Ok(epoch)
    }
}

fn stage_transactions(
    batch: &mut LedgerBatch<'_>,
    transactions: &[Transaction],
    verified: Vec<VerifiedTransfer>,
) -> ConsensusResult<()> {
    let mut verified = verified.into_iter();
    for (index, tx) in transactions.iter().enumerate() {
        let transfer = match tx {
            Transaction::Public(t) => Transfer::Public(*t),
            Transaction::Private(_) => Transfer::Private(verified.next().ok_or_else(|| {
                ConsensusError::InvalidTransaction {
                    index,
                    reason: "proof missing from verified batch".into(),
                }
            })?),
        };
        batch
            .stage(&transfer)
            .map_err(|e| ConsensusError::InvalidTransaction {
                index,
                reason: e.to_string(),
            })?;
    }
    Ok(())
}

#[async_trait]
impl<S: NullifierStore, G: GossipNetwork> ConsensusApi for ConsensusCoordinator<S, G> {
    async fn propose(&self, ctx: &CallContext, block: Block) -> ConsensusResult<ProposalId> {
        let hash = block.hash();
        let existing = self.rounds.lock().existing(&hash);
        if let Some(id) = existing {
            debug!(proposal_id = %id, "Block already proposed");
            return Ok(id);
        }

        if let Err(err) = self.validate_block(&block) {
            self.reject(ctx, block.height, hash, &err);
            return Err(err);
        }

        let block = Arc::new(block);
        let id = match self.open_round(hash, &block) {
            Ok(RoundEntry::Opened(id)) => id,
            Ok(RoundEntry::Known(id)) => return Ok(id),
            Err(err) => {
                self.reject(ctx, block.height, hash, &err);
                return Err(err);
            }
        };
        info!(
            proposal_id = %id,
            height = block.height,
            epoch = block.epoch,
            transactions = block.transactions.len(),
            entropy_records = block.entropy.len(),
            "Block proposed"
        );

        let message = GossipMessage::Proposal {
            id,
            block: Block::clone(&block),
        };
        if let Err(err) = self.gossip.broadcast(message).await {
            warn!(proposal_id = %id, error = %err, "Proposal broadcast failed");
        }
        Ok(id)
    }

    async fn vote(&self, proposal_id: ProposalId, vote: Vote) -> ConsensusResult<VoteOutcome> {
        let outcome = self.count_vote(proposal_id, &vote)?;
        metrics::record_vote(outcome.as_str());

        if matches!(outcome, VoteOutcome::Counted { .. }) {
            let message = GossipMessage::Vote { proposal_id, vote };
            if let Err(err) = self.gossip.broadcast(message).await {
                warn!(proposal_id = %proposal_id, error = %err, "Vote broadcast failed");
            }
        }
        Ok(outcome)
    }

    async fn try_finalize(
        &self,
        ctx: &CallContext,
        proposal_id: ProposalId,
    ) -> ConsensusResult<ConsensusProof> {
        ctx.require_write()?;

        loop {
            let (notify, deadline) = match self.poll_round(proposal_id)? {
                RoundPoll::Finalized(proof) => return Ok(proof),
                RoundPoll::Quorum => return self.finalize(ctx, proposal_id),
                RoundPoll::Waiting { notify, deadline } => (notify, deadline),
            };

            let notified = notify.notified();
            tokio::pin!(notified);
            // Register before re-checking so a vote landing in between wakes us
            notified.as_mut().enable();
            if !matches!(self.poll_round(proposal_id)?, RoundPoll::Waiting { .. }) {
                continue;
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = tokio::time::sleep_until(deadline) => {
                    if let Some(err) = self.expire(ctx, proposal_id) {
                        return Err(err);
                    }
                }
            }
        }
    }

    fn status(&self, proposal_id: ProposalId) -> Option<ProposalStatus> {
        self.rounds
            .lock()
            .proposals
            .get(&proposal_id)
            .map(|p| p.status)
    }

    fn finalized_height(&self) -> u64 {
        self.rounds.lock().finalized_height
    }
}
