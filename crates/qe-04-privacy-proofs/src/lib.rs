//! # qe-04-privacy-proofs
//!
//! Privacy Proof Verifier: validates zero-knowledge proofs for private
//! transfers with epoch freshness and replay protection.
//!
//! ## Flow
//!
//! ```text
//! ZkProof ─→ epoch window ─→ backend.verify(statement) ─→ NullifierRegistry.try_consume ─→ VerifiedTransfer
//! ```
//!
//! A proof bound to epoch `E` is accepted while the live epoch is within
//! `[E, E + lag]`. Nullifiers are consumed last, so a proof refused for
//! freshness or validity can be resubmitted once fixed.
//!
//! ## Backends
//!
//! The proof system is a [`ProofBackend`] chosen at configuration time.
//! See [`domain::ProofSystem`].

pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

pub use domain::{
    derive_nullifier, prove_transfer, AttestedBackend, Blinding, Commitment, PendingTransfer,
    PrivacyConfig, ProofBackend, ProofError, ProofResult, ProofSystem, PublicInputs,
    SpendSecret, Statement, TranscriptBackend, VerifiedTransfer, Witness, ZkProof,
};
pub use ports::PrivacyProofApi;
pub use service::PrivacyProofVerifier;
