//! Driving ports (Inbound API)

use crate::domain::{AppliedTransfer, LedgerResult, SimulationFailure, Transfer, TransferIntent};
use shared_types::{Address, CallContext};

/// Primary Ledger API
pub trait LedgerApi: Send + Sync {
    /// Apply one transfer. On error no balance changes.
    fn apply(&self, ctx: &CallContext, transfer: Transfer) -> LedgerResult<AppliedTransfer>;

    /// Dry-run `intents` in order against current balances. Never mutates
    /// and works from read-only contexts.
    fn simulate(
        &self,
        ctx: &CallContext,
        intents: &[TransferIntent],
    ) -> Result<Vec<AppliedTransfer>, SimulationFailure>;

    /// Zero for unknown accounts.
    fn balance_of(&self, account: &Address) -> u128;

    fn total_supply(&self) -> u128;
}
