//! # Shared Crypto
//!
//! Primitives used across the engine.
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256 | Pool mixing, commitments, block and record digests |
//! | `hashing` | BLAKE3 | Keyed transcripts, epoch key derivation |
//! | `signatures` | Ed25519 | Seismic source signatures, validator votes, prover attestations |
//!
//! ## Security Properties
//!
//! - **Ed25519**: deterministic nonces, strict verification (rejects
//!   non-canonical and small-order encodings)
//! - **Domain separation**: every hash use in the engine carries a versioned
//!   ASCII tag, so digests from one context never verify in another
//! - **Zeroize**: secret seeds are wiped when key pairs drop

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod signatures;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{
    blake3_derive_key, blake3_hash, blake3_keyed_hash, keccak256, keccak256_many, Blake3Hasher,
    KeccakHasher,
};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
