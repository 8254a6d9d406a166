//! Quantum key material and its derivation proof

use serde::{Deserialize, Serialize};
use shared_crypto::{blake3_derive_key, KeccakHasher};
use shared_types::{Epoch, Hash};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

const KEY_CONTEXT: &str = "qe/epoch-key/v1";
const FINGERPRINT_DOMAIN: &str = "qe/key-fingerprint/v1";

/// Secret key bytes. Wiped on drop, redacted in debug output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKeyBytes([u8; 32]);

impl SecretKeyBytes {
    pub fn expose(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for SecretKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKeyBytes(<redacted>)")
    }
}

/// Derive the epoch key from a pool mix.
///
/// BLAKE3 `derive_key("qe/epoch-key/v1", mix || epoch_le)`.
pub fn derive_epoch_key(pool_mix: &Hash, epoch: Epoch) -> SecretKeyBytes {
    let mut material = [0u8; 40];
    material[..32].copy_from_slice(pool_mix);
    material[32..].copy_from_slice(&epoch.to_le_bytes());
    let key = blake3_derive_key(KEY_CONTEXT, &material);
    material.zeroize();
    SecretKeyBytes(key)
}

/// Public fingerprint of a key. Safe to publish and embed in blocks.
pub fn key_fingerprint(key: &SecretKeyBytes) -> Hash {
    let mut hasher = KeccakHasher::with_domain(FINGERPRINT_DOMAIN);
    hasher.update(key.expose());
    hasher.finalize()
}

/// Evidence of how a key was derived.
///
/// Anyone holding the proof can re-derive and compare the fingerprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationProof {
    pub pool_mix: Hash,
    /// Total records folded into the pool at derivation time.
    pub record_count: u64,
    pub epoch: Epoch,
    pub key_fingerprint: Hash,
}

impl DerivationProof {
    /// Re-derive the key from the recorded mix and compare fingerprints.
    pub fn verify(&self) -> bool {
        key_fingerprint(&derive_epoch_key(&self.pool_mix, self.epoch)) == self.key_fingerprint
    }
}

/// Key material for one epoch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuantumKeyMaterial {
    epoch: Epoch,
    key: SecretKeyBytes,
    proof: DerivationProof,
}

impl QuantumKeyMaterial {
    /// Derive key material from pool state. The only constructor.
    pub fn derive(pool_mix: Hash, record_count: u64, epoch: Epoch) -> Self {
        let key = derive_epoch_key(&pool_mix, epoch);
        let proof = DerivationProof {
            pool_mix,
            record_count,
            epoch,
            key_fingerprint: key_fingerprint(&key),
        };
        Self { epoch, key, proof }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn key(&self) -> &SecretKeyBytes {
        &self.key
    }

    pub fn fingerprint(&self) -> Hash {
        self.proof.key_fingerprint
    }

    pub fn proof(&self) -> &DerivationProof {
        &self.proof
    }
}
