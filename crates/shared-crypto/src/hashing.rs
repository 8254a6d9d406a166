//! # Hashing
//!
//! Keccak-256 for consensus-visible digests (records, pool mix, commitments,
//! blocks) and BLAKE3 for keyed transcripts and key derivation.

use sha3::{Digest, Keccak256};

/// 256-bit hash output.
pub type Hash = [u8; 32];

/// Streaming Keccak-256 hasher.
#[derive(Clone, Default)]
pub struct KeccakHasher {
    inner: Keccak256,
}

impl KeccakHasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Keccak256::new(),
        }
    }

    /// Create a hasher whose first input is a domain tag.
    pub fn with_domain(domain: &str) -> Self {
        let mut hasher = Self::new();
        hasher.update(domain.as_bytes());
        hasher
    }

    /// Update with data.
    pub fn update(&mut self, data: impl AsRef<[u8]>) -> &mut Self {
        self.inner.update(data.as_ref());
        self
    }

    /// Finalize and return hash.
    pub fn finalize(self) -> Hash {
        let result = self.inner.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }
}

/// Keccak-256 of one input.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = KeccakHasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Keccak-256 over the concatenation of several inputs.
pub fn keccak256_many(inputs: &[&[u8]]) -> Hash {
    let mut hasher = KeccakHasher::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize()
}

/// Stateful BLAKE3 hasher.
pub struct Blake3Hasher {
    inner: blake3::Hasher,
}

impl Blake3Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: blake3::Hasher::new(),
        }
    }

    /// Create keyed hasher (for MAC).
    pub fn new_keyed(key: &[u8; 32]) -> Self {
        Self {
            inner: blake3::Hasher::new_keyed(key),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return hash.
    pub fn finalize(&self) -> Hash {
        *self.inner.finalize().as_bytes()
    }
}

impl Default for Blake3Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash data with BLAKE3 (one-shot).
pub fn blake3_hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// Keyed hash (MAC).
pub fn blake3_keyed_hash(key: &[u8; 32], data: &[u8]) -> Hash {
    *blake3::keyed_hash(key, data).as_bytes()
}

/// Derive a 32-byte key from a context string and input key material.
///
/// The context must be a hardcoded, globally unique string.
pub fn blake3_derive_key(context: &str, key_material: &[u8]) -> [u8; 32] {
    blake3::derive_key(context, key_material)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_known_vector() {
        // Keccak-256("") as used by Ethereum
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_keccak_streaming_matches_oneshot() {
        let mut hasher = KeccakHasher::new();
        hasher.update(b"hello ").update(b"world");
        assert_eq!(hasher.finalize(), keccak256(b"hello world"));
        assert_eq!(keccak256_many(&[b"hello ", b"world"]), keccak256(b"hello world"));
    }

    #[test]
    fn test_domain_separation() {
        let mut a = KeccakHasher::with_domain("qe/a");
        a.update(b"x");
        let mut b = KeccakHasher::with_domain("qe/b");
        b.update(b"x");
        assert_ne!(a.finalize(), b.finalize());
    }

    #[test]
    fn test_keyed_hash() {
        let key = [0xABu8; 32];
        let h1 = blake3_keyed_hash(&key, b"data");
        let h2 = blake3_keyed_hash(&key, b"data");
        let h3 = blake3_keyed_hash(&[0xCDu8; 32], b"data");

        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
    }

    #[test]
    fn test_derive_key_context_bound() {
        let k1 = blake3_derive_key("qe/test/one", b"material");
        let k2 = blake3_derive_key("qe/test/two", b"material");
        assert_ne!(k1, k2);
        assert_eq!(k1, blake3_derive_key("qe/test/one", b"material"));
    }

    #[test]
    fn test_blake3_streaming() {
        let mut hasher = Blake3Hasher::new();
        hasher.update(b"hello ").update(b"world");
        assert_eq!(hasher.finalize(), blake3_hash(b"hello world"));
    }
}
