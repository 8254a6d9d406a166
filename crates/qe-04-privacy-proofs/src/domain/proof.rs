//! Proof, statement and witness types

use super::{Blinding, Commitment, SpendSecret};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Epoch, Nullifier};

const STATEMENT_DOMAIN: &str = "qe/proof-statement/v1";

/// Values disclosed to the ledger by a private transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicInputs {
    pub sender: Address,
    pub recipient: Address,
    pub amount: u128,
}

/// Proof for a private transfer.
///
/// Verifies only for the exact (commitment, nullifier, public inputs, epoch).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkProof {
    pub nullifier: Nullifier,
    pub commitment: Commitment,
    pub proof_bytes: Vec<u8>,
    pub public_inputs: PublicInputs,
    pub bound_epoch: Epoch,
}

impl ZkProof {
    pub fn statement(&self) -> Statement {
        Statement {
            commitment: self.commitment,
            nullifier: self.nullifier,
            public_inputs: self.public_inputs,
            epoch: self.bound_epoch,
        }
    }
}

/// What a proof claims.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Statement {
    pub commitment: Commitment,
    pub nullifier: Nullifier,
    pub public_inputs: PublicInputs,
    pub epoch: Epoch,
}

impl Statement {
    /// Canonical bytes every backend binds its proof to.
    pub fn transcript_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(STATEMENT_DOMAIN.len() + 32 + 32 + 20 + 20 + 16 + 8);
        out.extend_from_slice(STATEMENT_DOMAIN.as_bytes());
        out.extend_from_slice(self.commitment.as_bytes());
        out.extend_from_slice(self.nullifier.as_bytes());
        out.extend_from_slice(&self.public_inputs.sender);
        out.extend_from_slice(&self.public_inputs.recipient);
        out.extend_from_slice(&self.public_inputs.amount.to_le_bytes());
        out.extend_from_slice(&self.epoch.to_le_bytes());
        out
    }
}

/// Private inputs known only to the prover.
#[derive(Clone, Debug)]
pub struct Witness {
    pub amount: u128,
    pub blinding: Blinding,
    pub spend_secret: SpendSecret,
}

impl Witness {
    /// Whether this witness satisfies `statement`.
    pub fn satisfies(&self, statement: &Statement) -> bool {
        statement.commitment.opens(self.amount, &self.blinding)
            && super::derive_nullifier(&self.spend_secret, &statement.commitment)
                == statement.nullifier
            && statement.public_inputs.amount == self.amount
    }
}
