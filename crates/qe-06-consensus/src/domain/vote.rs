//! Validator votes

use serde::{Deserialize, Serialize};
use shared_crypto::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use shared_types::{Hash, ValidatorId};

const VOTE_DOMAIN: &[u8] = b"qe/vote/v1";

/// Bytes a validator signs to endorse `block_hash` at `height`.
pub fn vote_signing_bytes(block_hash: &Hash, height: u64) -> Vec<u8> {
    let mut message = Vec::with_capacity(VOTE_DOMAIN.len() + 40);
    message.extend_from_slice(VOTE_DOMAIN);
    message.extend_from_slice(block_hash);
    message.extend_from_slice(&height.to_le_bytes());
    message
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub validator: ValidatorId,
    pub block_hash: Hash,
    pub height: u64,
    pub signature: Ed25519Signature,
}

impl Vote {
    /// Sign a vote with the validator key. The validator id is the public key.
    pub fn sign(key: &Ed25519KeyPair, block_hash: Hash, height: u64) -> Self {
        Self {
            validator: *key.public_key().as_bytes(),
            block_hash,
            height,
            signature: key.sign(&vote_signing_bytes(&block_hash, height)),
        }
    }

    pub fn verify(&self, public_key: &Ed25519PublicKey) -> bool {
        public_key
            .verify(
                &vote_signing_bytes(&self.block_hash, self.height),
                &self.signature,
            )
            .is_ok()
    }
}
