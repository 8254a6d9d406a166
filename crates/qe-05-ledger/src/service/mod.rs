//! Transaction Ledger
//!
//! # Mutation path
//! Every mutation runs through a [`LedgerBatch`]:
//!
//! 1. `begin_batch` checks the call-level pipeline steps, takes the
//!    reentrancy token and the ledger write lock
//! 2. `stage` checks the transfer-level steps and moves balances in an
//!    overlay; a failing stage leaves the overlay as it was
//! 3. `commit` merges the overlay and emits `TransferApplied` events;
//!    dropping the batch discards it
//!
//! `apply` is a one-transfer batch.

use crate::domain::{
    AppliedTransfer, LedgerConfig, LedgerError, LedgerResult, Leg, Overlay, SimulationFailure,
    Transfer, TransferIntent, ValidationPipeline,
};
use crate::metrics;
use crate::ports::LedgerApi;
use parking_lot::{RwLock, RwLockWriteGuard};
use shared_types::{
    short_hex, Address, CallContext, EngineEvent, ReentrancyToken, TransferKind,
};
use std::collections::HashMap;
use tracing::{debug, warn};

#[cfg(test)]
mod tests;

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<Address, u128>,
    total_supply: u128,
}

/// Account balances, mutated only by validated transfers.
pub struct TransactionLedger {
    config: LedgerConfig,
    pipeline: ValidationPipeline,
    state: RwLock<LedgerState>,
}

impl TransactionLedger {
    /// Ledger with no balances.
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            pipeline: ValidationPipeline::standard(config.epoch_lag_tolerance),
            config,
            state: RwLock::new(LedgerState::default()),
        }
    }

    /// Ledger seeded with genesis allocations. Repeated accounts add up.
    pub fn with_genesis(
        config: LedgerConfig,
        allocations: impl IntoIterator<Item = (Address, u128)>,
    ) -> LedgerResult<Self> {
        let ledger = Self::new(config);
        {
            let mut state = ledger.state.write();
            for (account, amount) in allocations {
                if amount == 0 {
                    continue;
                }
                let balance = state.balances.entry(account).or_insert(0);
                *balance = balance
                    .checked_add(amount)
                    .ok_or(LedgerError::Overflow { account })?;
                state.total_supply = state
                    .total_supply
                    .checked_add(amount)
                    .ok_or(LedgerError::Overflow { account })?;
            }
            debug!(
                accounts = state.balances.len(),
                total_supply = state.total_supply,
                "Ledger genesis loaded"
            );
        }
        Ok(ledger)
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &ValidationPipeline {
        &self.pipeline
    }

    /// Sum of every balance. Equals `total_supply` at all times.
    pub fn sum_of_balances(&self) -> u128 {
        self.state
            .read()
            .balances
            .values()
            .fold(0u128, |acc, b| acc.saturating_add(*b))
    }

    /// Number of accounts with a non-zero balance.
    pub fn account_count(&self) -> usize {
        self.state.read().balances.len()
    }

    /// Start an atomic multi-transfer mutation.
    ///
    /// Holds the ledger write lock and the context's reentrancy token until
    /// the batch is committed or dropped.
    pub fn begin_batch<'a>(&'a self, ctx: &'a CallContext) -> LedgerResult<LedgerBatch<'a>> {
        self.pipeline.check_call(ctx).map_err(rejected)?;
        let token = ctx.enter().map_err(|e| rejected(e.into()))?;

        Ok(LedgerBatch {
            ctx,
            pipeline: &self.pipeline,
            state: self.state.write(),
            overlay: Overlay::default(),
            applied: Vec::new(),
            _token: token,
        })
    }
}

impl LedgerApi for TransactionLedger {
    fn apply(&self, ctx: &CallContext, transfer: Transfer) -> LedgerResult<AppliedTransfer> {
        let mut batch = self.begin_batch(ctx)?;
        let applied = batch.stage(&transfer)?;
        batch.commit();
        Ok(applied)
    }

    fn simulate(
        &self,
        ctx: &CallContext,
        intents: &[TransferIntent],
    ) -> Result<Vec<AppliedTransfer>, SimulationFailure> {
        let state = self.state.read();
        let mut overlay = Overlay::default();

        intents
            .iter()
            .enumerate()
            .map(|(index, intent)| {
                let leg = intent.leg();
                self.pipeline
                    .check_transfer(ctx, leg.epoch)
                    .and_then(|_| move_leg(&mut overlay, &state.balances, leg))
                    .map_err(|error| SimulationFailure { index, error })
            })
            .collect()
    }

    fn balance_of(&self, account: &Address) -> u128 {
        self.state.read().balances.get(account).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> u128 {
        self.state.read().total_supply
    }
}

/// Exclusive, all-or-nothing ledger mutation.
pub struct LedgerBatch<'a> {
    ctx: &'a CallContext,
    pipeline: &'a ValidationPipeline,
    state: RwLockWriteGuard<'a, LedgerState>,
    overlay: Overlay,
    applied: Vec<AppliedTransfer>,
    _token: ReentrancyToken<'a>,
}

impl LedgerBatch<'_> {
    /// Stage one transfer on top of those already staged.
    pub fn stage(&mut self, transfer: &Transfer) -> LedgerResult<AppliedTransfer> {
        let leg = transfer.leg();
        let applied = self
            .pipeline
            .check_transfer(self.ctx, leg.epoch)
            .and_then(|_| move_leg(&mut self.overlay, &self.state.balances, leg))
            .map_err(|err| {
                warn!(
                    sender = %short_hex(&leg.sender),
                    amount = leg.amount,
                    reason = err.reason(),
                    "Transfer refused"
                );
                rejected(err)
            })?;
        self.applied.push(applied);
        Ok(applied)
    }

    /// Transfers staged so far.
    pub fn staged(&self) -> &[AppliedTransfer] {
        &self.applied
    }

    /// Balance including staged transfers.
    pub fn balance_of(&self, account: &Address) -> u128 {
        self.overlay.balance(&self.state.balances, account)
    }

    /// Merge staged balances and emit one event per transfer.
    pub fn commit(mut self) -> Vec<AppliedTransfer> {
        let overlay = std::mem::take(&mut self.overlay);
        overlay.merge_into(&mut self.state.balances);
        let accounts = self.state.balances.len();

        for applied in &self.applied {
            let leg = applied.leg;
            metrics::record_applied(kind_label(leg.kind), accounts);
            self.ctx.emit(EngineEvent::TransferApplied {
                kind: leg.kind,
                sender: leg.sender,
                recipient: leg.recipient,
                amount: leg.amount,
            });
        }
        debug!(transfers = self.applied.len(), "Ledger batch committed");
        std::mem::take(&mut self.applied)
    }
}

fn move_leg(
    overlay: &mut Overlay,
    base: &HashMap<Address, u128>,
    leg: Leg,
) -> LedgerResult<AppliedTransfer> {
    let (sender_balance, recipient_balance) =
        overlay.transfer(base, leg.sender, leg.recipient, leg.amount)?;
    Ok(AppliedTransfer {
        leg,
        sender_balance,
        recipient_balance,
    })
}

fn kind_label(kind: TransferKind) -> &'static str {
    match kind {
        TransferKind::Public => "public",
        TransferKind::Private => "private",
    }
}

fn rejected(err: LedgerError) -> LedgerError {
    metrics::record_rejected(err.reason());
    err
}
