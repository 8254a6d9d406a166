//! Block and transaction entities

use qe_01_entropy_feed::SeismicRecord;
use qe_04_privacy_proofs::ZkProof;
use qe_05_ledger::PublicTransfer;
use serde::{Deserialize, Serialize};
use shared_crypto::{keccak256, KeccakHasher};
use shared_types::{Epoch, Hash, ValidatorId};

const BLOCK_DOMAIN: &str = "qe/block/v1";

/// A public or private transfer carried by a block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transaction {
    Public(PublicTransfer),
    Private(ZkProof),
}

impl Transaction {
    /// Epoch the transaction was created under.
    pub fn epoch(&self) -> Epoch {
        match self {
            Transaction::Public(t) => t.epoch,
            Transaction::Private(p) => p.bound_epoch,
        }
    }

    fn write_canonical(&self, hasher: &mut KeccakHasher) {
        match self {
            Transaction::Public(t) => {
                hasher
                    .update([0u8])
                    .update(t.from)
                    .update(t.to)
                    .update(t.amount.to_le_bytes())
                    .update(t.epoch.to_le_bytes());
            }
            Transaction::Private(p) => {
                hasher
                    .update([1u8])
                    .update(p.statement().transcript_bytes())
                    .update(keccak256(&p.proof_bytes));
            }
        }
    }
}

/// Candidate ledger update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub height: u64,
    pub proposer: ValidatorId,
    /// Quantum epoch the block was built under.
    pub epoch: Epoch,
    /// Key fingerprint of `epoch` as seen by the proposer.
    pub quantum_fingerprint: Hash,
    pub transactions: Vec<Transaction>,
    /// Seismic records folded into the pool when the block finalizes.
    pub entropy: Vec<SeismicRecord>,
}

impl Block {
    /// Keccak-256 over the canonical encoding. Records contribute their
    /// digests, transactions their tagged fields.
    pub fn hash(&self) -> Hash {
        let mut hasher = KeccakHasher::with_domain(BLOCK_DOMAIN);
        hasher
            .update(self.height.to_le_bytes())
            .update(self.proposer)
            .update(self.epoch.to_le_bytes())
            .update(self.quantum_fingerprint)
            .update((self.transactions.len() as u64).to_le_bytes());
        for tx in &self.transactions {
            tx.write_canonical(&mut hasher);
        }
        hasher.update((self.entropy.len() as u64).to_le_bytes());
        for record in &self.entropy {
            hasher.update(record.digest());
        }
        hasher.finalize()
    }

    /// Private transfer proofs in block order.
    pub fn proofs(&self) -> impl Iterator<Item = &ZkProof> {
        self.transactions.iter().filter_map(|tx| match tx {
            Transaction::Private(p) => Some(p),
            Transaction::Public(_) => None,
        })
    }
}
