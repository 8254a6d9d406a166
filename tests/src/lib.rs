//! # Quantum-Entropy Engine Test Suite
//!
//! Cross-subsystem scenarios run against a fully assembled engine.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Engine builder, signed records, transfers, proofs
//! └── integration/      # End-to-end flows
//!     ├── rotation.rs
//!     ├── privacy_flow.rs
//!     ├── quorum.rs
//!     ├── ledger_flow.rs
//!     ├── replay_race.rs
//!     └── pipeline.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p qe-tests
//!
//! # By scenario
//! cargo test -p qe-tests integration::quorum::
//!
//! # Benchmarks
//! cargo bench -p qe-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
