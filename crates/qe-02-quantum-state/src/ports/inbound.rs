//! Driving ports (Inbound API)

use crate::domain::{QuantumResult, QuantumState, RotationPhase};
use qe_01_entropy_feed::ValidRecord;
use shared_types::{CallContext, Epoch, Hash};

/// Primary Quantum State API
pub trait QuantumStateApi: Send + Sync {
    /// Snapshot of the live state.
    fn current_state(&self) -> QuantumState;

    /// Fold validated records and rotate to the next epoch.
    ///
    /// On error the prior state and pool are untouched.
    fn propose_rotation(
        &self,
        ctx: &CallContext,
        records: Vec<ValidRecord>,
    ) -> QuantumResult<QuantumState>;

    /// Fingerprint of a recent epoch, if still in history.
    fn fingerprint_at(&self, epoch: Epoch) -> Option<Hash>;

    /// Current phase of the rotation state machine.
    fn phase(&self) -> RotationPhase;
}
