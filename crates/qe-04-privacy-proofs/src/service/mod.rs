//! Privacy Proof Verifier
//!
//! # Check Order
//! 1. Epoch freshness (`StaleEpoch`, `FutureEpoch`)
//! 2. Proof validity against its statement (`InvalidProof`)
//! 3. Nullifier consumption, last (`Replayed`)

use crate::domain::{
    PendingTransfer, PrivacyConfig, ProofBackend, ProofError, ProofResult, ProofSystem,
    VerifiedTransfer, ZkProof,
};
use crate::metrics;
use crate::ports::PrivacyProofApi;
use qe_03_nullifier_registry::{
    NullifierRegistry, NullifierRegistryApi, NullifierStore, ReplayError,
};
use shared_types::{CallContext, EngineEvent, Epoch, Nullifier};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};


pub struct PrivacyProofVerifier<S: NullifierStore> {
    registry: Arc<NullifierRegistry<S>>,
    backend: ProofBackend,
    config: PrivacyConfig,
}

/// Failure inside a batch: either consumption or the caller's apply step.
enum BatchFailure<E> {
    Replay(ReplayError),
    Apply(E),
}

impl<E> From<ReplayError> for BatchFailure<E> {
    fn from(err: ReplayError) -> Self {
        BatchFailure::Replay(err)
    }
}

impl<S: NullifierStore> PrivacyProofVerifier<S> {
    pub fn new(
        registry: Arc<NullifierRegistry<S>>,
        backend: ProofBackend,
        config: PrivacyConfig,
    ) -> Self {
        Self {
            registry,
            backend,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<NullifierRegistry<S>> {
        &self.registry
    }

    pub fn backend(&self) -> &ProofBackend {
        &self.backend
    }

    pub fn config(&self) -> &PrivacyConfig {
        &self.config
    }

    fn check_epoch(&self, proof: &ZkProof, current_epoch: Epoch) -> ProofResult<()> {
        let lag = self.config.epoch_lag_tolerance;
        if proof.bound_epoch > current_epoch {
            return Err(ProofError::FutureEpoch {
                bound: proof.bound_epoch,
                current: current_epoch,
            });
        }
        if proof.bound_epoch.saturating_add(lag) < current_epoch {
            return Err(ProofError::StaleEpoch {
                bound: proof.bound_epoch,
                current: current_epoch,
                lag,
            });
        }
        Ok(())
    }

    fn check_proof(&self, proof: &ZkProof) -> ProofResult<()> {
        if proof.proof_bytes.is_empty() {
            return Err(ProofError::InvalidProof {
                reason: "empty proof",
            });
        }
        if !self.backend.verify(&proof.statement(), &proof.proof_bytes) {
            return Err(ProofError::InvalidProof {
                reason: "proof does not verify against its statement",
            });
        }
        Ok(())
    }

    fn check_stateless(&self, proof: &ZkProof, current_epoch: Epoch) -> ProofResult<PendingTransfer> {
        self.check_epoch(proof, current_epoch)
            .and_then(|_| self.check_proof(proof))
            .map(|_| pending(proof))
            .map_err(|e| rejected(proof, e))
    }

    /// Verify a batch and apply it atomically with nullifier consumption.
    ///
    /// Every proof is checked first; duplicate nullifiers within the batch
    /// are refused. `apply` then runs on the verified transfers, in batch
    /// order, while the registry lock is held. Nullifiers are consumed only
    /// if `apply` succeeds.
    pub fn verify_batch_with<T, E>(
        &self,
        ctx: &CallContext,
        proofs: &[ZkProof],
        current_epoch: Epoch,
        apply: impl FnOnce(Vec<VerifiedTransfer>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<ProofError>,
    {
        ctx.require_write().map_err(ProofError::from)?;

        let mut seen = HashSet::with_capacity(proofs.len());
        let mut transfers = Vec::with_capacity(proofs.len());
        for proof in proofs {
            let pending = self.check_stateless(proof, current_epoch)?;
            if !seen.insert(pending.nullifier) {
                return Err(rejected(proof, ProofError::DuplicateInBatch(pending.nullifier)).into());
            }
            transfers.push(VerifiedTransfer::from_pending(pending));
        }

        let nullifiers: Vec<Nullifier> = transfers.iter().map(|t| t.nullifier()).collect();
        let count = transfers.len();

        match self
            .registry
            .consume_with(&nullifiers, || apply(transfers).map_err(BatchFailure::Apply))
        {
            Ok(output) => {
                metrics::record_verified(count);
                debug!(count, epoch = current_epoch, "Proof batch verified");
                Ok(output)
            }
            Err(BatchFailure::Apply(err)) => Err(err),
            Err(BatchFailure::Replay(err)) => Err(self.replay_failure(ctx, err).into()),
        }
    }

    fn replay_failure(&self, ctx: &CallContext, err: ReplayError) -> ProofError {
        if let ReplayError::AlreadyUsed(nullifier) = &err {
            ctx.emit(EngineEvent::NullifierReplayAttempt {
                nullifier: *nullifier,
            });
        }
        let err = ProofError::from(err);
        metrics::record_rejected(err.reason());
        err
    }
}

impl<S: NullifierStore> PrivacyProofApi for PrivacyProofVerifier<S> {
    fn verify(
        &self,
        ctx: &CallContext,
        proof: &ZkProof,
        current_epoch: Epoch,
    ) -> ProofResult<VerifiedTransfer> {
        ctx.require_write()?;
        let pending = self.check_stateless(proof, current_epoch)?;

        self.registry
            .try_consume(pending.nullifier)
            .map_err(|e| self.replay_failure(ctx, e))?;

        metrics::record_verified(1);
        debug!(
            nullifier = %pending.nullifier,
            epoch = proof.bound_epoch,
            "Private transfer proof verified"
        );
        Ok(VerifiedTransfer::from_pending(pending))
    }

    fn preflight(&self, proof: &ZkProof, current_epoch: Epoch) -> ProofResult<PendingTransfer> {
        let pending = self.check_stateless(proof, current_epoch)?;
        if self.registry.is_consumed(&pending.nullifier)? {
            return Err(ProofError::Replayed(pending.nullifier));
        }
        Ok(pending)
    }
}

fn pending(proof: &ZkProof) -> PendingTransfer {
    PendingTransfer {
        nullifier: proof.nullifier,
        commitment: proof.commitment,
        sender: proof.public_inputs.sender,
        recipient: proof.public_inputs.recipient,
        amount: proof.public_inputs.amount,
        epoch: proof.bound_epoch,
    }
}

fn rejected(proof: &ZkProof, err: ProofError) -> ProofError {
    warn!(
        nullifier = %proof.nullifier,
        bound_epoch = proof.bound_epoch,
        reason = err.reason(),
        "Private transfer proof rejected"
    );
    metrics::record_rejected(err.reason());
    err
}
