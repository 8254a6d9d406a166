//! Balance arithmetic over a base map and a staging overlay

use super::{LedgerError, LedgerResult};
use shared_types::Address;
use std::collections::HashMap;

/// Balances staged on top of committed state.
#[derive(Debug, Default)]
pub struct Overlay {
    staged: HashMap<Address, u128>,
}

impl Overlay {
    pub fn balance(&self, base: &HashMap<Address, u128>, account: &Address) -> u128 {
        self.staged
            .get(account)
            .or_else(|| base.get(account))
            .copied()
            .unwrap_or(0)
    }

    /// Move `amount` from `sender` to `recipient`. Nothing is written unless
    /// both sides succeed. Returns the new `(sender, recipient)` balances.
    pub fn transfer(
        &mut self,
        base: &HashMap<Address, u128>,
        sender: Address,
        recipient: Address,
        amount: u128,
    ) -> LedgerResult<(u128, u128)> {
        let available = self.balance(base, &sender);
        let sender_after = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                account: sender,
                required: amount,
                available,
            })?;

        if sender == recipient {
            return Ok((available, available));
        }

        let recipient_after = self
            .balance(base, &recipient)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { account: recipient })?;

        self.staged.insert(sender, sender_after);
        self.staged.insert(recipient, recipient_after);
        Ok((sender_after, recipient_after))
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Write staged balances into `base`. Zero balances are pruned.
    pub fn merge_into(self, base: &mut HashMap<Address, u128>) {
        for (account, balance) in self.staged {
            if balance == 0 {
                base.remove(&account);
            } else {
                base.insert(account, balance);
            }
        }
    }
}
