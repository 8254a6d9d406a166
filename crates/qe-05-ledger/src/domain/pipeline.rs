//! # Validation Pipeline
//!
//! Ordered checks every ledger mutation passes before its core logic:
//!
//! 1. `WriteAccess`: the call context may write
//! 2. `QuantumSafe { lag }`: the transfer's epoch is within `lag` of the
//!    context's live epoch
//!
//! Steps run in declaration order; the first failure wins.

use super::{LedgerError, LedgerResult};
use shared_types::{CallContext, Epoch};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallGuard {
    WriteAccess,
    QuantumSafe { lag: u64 },
}

impl CallGuard {
    /// Check one step. `transfer_epoch` is `None` for call-level checks.
    pub fn check(&self, ctx: &CallContext, transfer_epoch: Option<Epoch>) -> LedgerResult<()> {
        match (self, transfer_epoch) {
            (CallGuard::WriteAccess, _) => ctx.require_write().map_err(LedgerError::from),
            (CallGuard::QuantumSafe { .. }, None) => Ok(()),
            (CallGuard::QuantumSafe { lag }, Some(epoch)) => {
                let live = ctx.live_epoch().ok_or(LedgerError::NoLiveEpoch)?;
                if epoch > live {
                    Err(LedgerError::FutureEpoch { epoch, live })
                } else if epoch.saturating_add(*lag) < live {
                    Err(LedgerError::StaleEpoch {
                        epoch,
                        live,
                        lag: *lag,
                    })
                } else {
                    Ok(())
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationPipeline {
    steps: Vec<CallGuard>,
}

impl ValidationPipeline {
    pub fn new(steps: Vec<CallGuard>) -> Self {
        Self { steps }
    }

    /// `WriteAccess` then `QuantumSafe { lag }`.
    pub fn standard(lag: u64) -> Self {
        Self::new(vec![CallGuard::WriteAccess, CallGuard::QuantumSafe { lag }])
    }

    pub fn steps(&self) -> &[CallGuard] {
        &self.steps
    }

    /// Call-level steps (before any transfer is staged).
    pub fn check_call(&self, ctx: &CallContext) -> LedgerResult<()> {
        self.steps.iter().try_for_each(|step| step.check(ctx, None))
    }

    /// Transfer-level steps. Skips `WriteAccess` so dry runs can reuse them.
    pub fn check_transfer(&self, ctx: &CallContext, epoch: Epoch) -> LedgerResult<()> {
        self.steps
            .iter()
            .filter(|step| !matches!(step, CallGuard::WriteAccess))
            .try_for_each(|step| step.check(ctx, Some(epoch)))
    }
}
