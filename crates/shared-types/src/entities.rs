//! # Core Domain Identifiers
//!
//! Byte-array identifiers shared by every subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte hash (Keccak-256 or BLAKE3).
pub type Hash = [u8; 32];

/// A 20-byte account address.
pub type Address = [u8; 20];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// Validator identifier. Equal to the validator's Ed25519 public key.
pub type ValidatorId = [u8; 32];

/// Generation counter of quantum key material.
pub type Epoch = u64;

/// Zero hash, used as "no value" in fingerprints and genesis state.
pub const ZERO_HASH: Hash = [0u8; 32];

/// One-time tag revealed when a private value is spent.
///
/// Opaque 32 bytes. Once consumed by the nullifier registry it can never be
/// consumed again.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Nullifier(pub [u8; 32]);

impl Nullifier {
    /// Wrap raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Nullifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&short_hex(&self.0))
    }
}

impl fmt::Debug for Nullifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nullifier({})", short_hex(&self.0))
    }
}

/// Abbreviated hex rendering for logs: first 4 and last 2 bytes.
pub fn short_hex(bytes: &[u8]) -> String {
    if bytes.len() <= 6 {
        return hex::encode(bytes);
    }
    format!(
        "{}..{}",
        hex::encode(&bytes[..4]),
        hex::encode(&bytes[bytes.len() - 2..])
    )
}
