//! Commitments and nullifier derivation
//!
//! ```text
//! commitment = Keccak256("qe/commitment/v1" || amount_le || blinding)
//! nullifier  = Keccak256("qe/nullifier/v1"  || spend_secret || commitment)
//! ```
//!
//! The blinding factor hides the amount; the spend secret makes the
//! nullifier unlinkable to the commitment for anyone but the owner.

use serde::{Deserialize, Serialize};
use shared_crypto::KeccakHasher;
use shared_types::{short_hex, Hash, Nullifier};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

const COMMITMENT_DOMAIN: &str = "qe/commitment/v1";
const NULLIFIER_DOMAIN: &str = "qe/nullifier/v1";

/// Secret randomness kept by the commitment owner.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Blinding(pub [u8; 32]);

/// Secret authorizing a spend.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SpendSecret(pub [u8; 32]);

impl fmt::Debug for Blinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Blinding(<redacted>)")
    }
}

impl fmt::Debug for SpendSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SpendSecret(<redacted>)")
    }
}

/// Blinded value bound to an amount and a secret.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment(pub Hash);

impl Commitment {
    pub fn commit(amount: u128, blinding: &Blinding) -> Self {
        let mut hasher = KeccakHasher::with_domain(COMMITMENT_DOMAIN);
        hasher.update(amount.to_le_bytes()).update(&blinding.0);
        Self(hasher.finalize())
    }

    /// Whether `(amount, blinding)` opens this commitment.
    pub fn opens(&self, amount: u128, blinding: &Blinding) -> bool {
        Self::commit(amount, blinding) == *self
    }

    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", short_hex(&self.0))
    }
}

/// Nullifier revealed when spending `commitment`.
pub fn derive_nullifier(secret: &SpendSecret, commitment: &Commitment) -> Nullifier {
    let mut hasher = KeccakHasher::with_domain(NULLIFIER_DOMAIN);
    hasher.update(&secret.0).update(commitment.0);
    Nullifier(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commitment_binds_amount_and_blinding() {
        let blinding = Blinding([1u8; 32]);
        let c = Commitment::commit(100, &blinding);

        assert!(c.opens(100, &blinding));
        assert!(!c.opens(101, &blinding));
        assert!(!c.opens(100, &Blinding([2u8; 32])));
    }

    #[test]
    fn test_same_amount_hidden_by_blinding() {
        let a = Commitment::commit(100, &Blinding([1u8; 32]));
        let b = Commitment::commit(100, &Blinding([2u8; 32]));
        assert_ne!(a, b);
    }

    #[test]
    fn test_nullifier_depends_on_secret_and_commitment() {
        let c1 = Commitment::commit(5, &Blinding([1u8; 32]));
        let c2 = Commitment::commit(5, &Blinding([2u8; 32]));
        let s1 = SpendSecret([9u8; 32]);
        let s2 = SpendSecret([8u8; 32]);

        assert_eq!(derive_nullifier(&s1, &c1), derive_nullifier(&s1, &c1));
        assert_ne!(derive_nullifier(&s1, &c1), derive_nullifier(&s2, &c1));
        assert_ne!(derive_nullifier(&s1, &c1), derive_nullifier(&s1, &c2));
    }
}
