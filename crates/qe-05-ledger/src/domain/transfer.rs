//! Transfer types

use qe_04_privacy_proofs::{PendingTransfer, VerifiedTransfer};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Epoch, TransferKind};

/// Plain transfer between visible accounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicTransfer {
    pub from: Address,
    pub to: Address,
    pub amount: u128,
    /// Quantum epoch the sender observed when signing.
    pub epoch: Epoch,
}

/// A transfer ready to mutate balances.
///
/// Private transfers require a [`VerifiedTransfer`], which only the proof
/// verifier can produce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transfer {
    Public(PublicTransfer),
    Private(VerifiedTransfer),
}

/// A transfer to dry-run before voting. Private intents are preflighted
/// proofs whose nullifiers are not yet consumed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransferIntent {
    Public(PublicTransfer),
    Private(PendingTransfer),
}

/// The balance movement common to every transfer variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Leg {
    pub kind: TransferKind,
    pub sender: Address,
    pub recipient: Address,
    pub amount: u128,
    pub epoch: Epoch,
}

impl Transfer {
    pub fn leg(&self) -> Leg {
        match self {
            Transfer::Public(t) => public_leg(t),
            Transfer::Private(t) => Leg {
                kind: TransferKind::Private,
                sender: t.sender(),
                recipient: t.recipient(),
                amount: t.amount(),
                epoch: t.epoch(),
            },
        }
    }
}

impl TransferIntent {
    pub fn leg(&self) -> Leg {
        match self {
            TransferIntent::Public(t) => public_leg(t),
            TransferIntent::Private(t) => Leg {
                kind: TransferKind::Private,
                sender: t.sender,
                recipient: t.recipient,
                amount: t.amount,
                epoch: t.epoch,
            },
        }
    }
}

fn public_leg(t: &PublicTransfer) -> Leg {
    Leg {
        kind: TransferKind::Public,
        sender: t.from,
        recipient: t.to,
        amount: t.amount,
        epoch: t.epoch,
    }
}

/// Outcome of one applied (or simulated) transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppliedTransfer {
    pub leg: Leg,
    pub sender_balance: u128,
    pub recipient_balance: u128,
}
