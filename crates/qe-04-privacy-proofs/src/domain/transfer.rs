//! Transfers produced by proof verification

use super::Commitment;
use shared_types::{Address, Epoch, Nullifier};

/// A private transfer whose proof verified and whose nullifier is consumed.
///
/// Only this crate constructs it, so holding one is evidence that
/// verification happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedTransfer {
    nullifier: Nullifier,
    commitment: Commitment,
    sender: Address,
    recipient: Address,
    amount: u128,
    epoch: Epoch,
}

impl VerifiedTransfer {
    pub(crate) fn from_pending(pending: PendingTransfer) -> Self {
        Self {
            nullifier: pending.nullifier,
            commitment: pending.commitment,
            sender: pending.sender,
            recipient: pending.recipient,
            amount: pending.amount,
            epoch: pending.epoch,
        }
    }

    pub fn nullifier(&self) -> Nullifier {
        self.nullifier
    }

    pub fn commitment(&self) -> Commitment {
        self.commitment
    }

    pub fn sender(&self) -> Address {
        self.sender
    }

    pub fn recipient(&self) -> Address {
        self.recipient
    }

    pub fn amount(&self) -> u128 {
        self.amount
    }

    /// Epoch the proof was bound to.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }
}

/// A proof that passed every check except consumption of its nullifier.
///
/// Advisory: another caller may consume the nullifier first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingTransfer {
    pub nullifier: Nullifier,
    pub commitment: Commitment,
    pub sender: Address,
    pub recipient: Address,
    pub amount: u128,
    pub epoch: Epoch,
}
