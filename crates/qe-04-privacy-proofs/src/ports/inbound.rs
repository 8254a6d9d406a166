//! Driving ports (Inbound API)

use crate::domain::{PendingTransfer, ProofResult, VerifiedTransfer, ZkProof};
use shared_types::{CallContext, Epoch};

/// Primary Privacy Proof API
pub trait PrivacyProofApi: Send + Sync {
    /// Check epoch freshness, verify the proof, then consume its nullifier.
    ///
    /// A freshness or validity failure never consumes the nullifier.
    fn verify(
        &self,
        ctx: &CallContext,
        proof: &ZkProof,
        current_epoch: Epoch,
    ) -> ProofResult<VerifiedTransfer>;

    /// The same checks without consuming anything.
    fn preflight(&self, proof: &ZkProof, current_epoch: Epoch) -> ProofResult<PendingTransfer>;
}
