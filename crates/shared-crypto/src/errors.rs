//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Signature did not verify under the given key
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Bytes do not encode a valid Ed25519 point
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Signature has the wrong length
    #[error("Invalid signature length: expected {expected}, got {actual}")]
    InvalidSignatureLength {
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },
}
