//! # qe-02-quantum-state
//!
//! Quantum State Manager: owns the entropy pool and the rotating key
//! material of the engine.
//!
//! ## Rotation
//!
//! ```text
//! ValidRecord* ──fold──→ EntropyPool.mix ──derive(mix, epoch+1)──→ QuantumKeyMaterial
//!                                                     │
//!                        entropy estimate ≥ min? ─────┴──→ QuantumState (epoch+1)
//! ```
//!
//! - Mixing: sequential Keccak-256 chaining, versioned `qe/pool-mix/v1`
//! - Derivation: BLAKE3 `derive_key("qe/epoch-key/v1", mix || epoch)`
//! - A refused rotation leaves state and pool untouched
//! - Epochs strictly increase by one; never rolled back
//!
//! ## Atomic commit with other subsystems
//!
//! Consensus uses the two-phase API so that a block's rotation, ledger delta
//! and nullifiers land together:
//!
//! ```rust,ignore
//! let mut txn = manager.begin_rotation();
//! let prepared = txn.prepare(&records, now)?;
//! // ... stage ledger and nullifiers ...
//! txn.commit(prepared)?;
//! ```

pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

pub use domain::{
    derive_epoch_key, genesis_mix, key_fingerprint, mix_step, DerivationProof, EntropyPool,
    QuantumConfig, QuantumError, QuantumKeyMaterial, QuantumResult, QuantumState,
    RotationPhase,
};
pub use ports::QuantumStateApi;
pub use service::{PreparedRotation, QuantumStateManager, RotationTxn};
