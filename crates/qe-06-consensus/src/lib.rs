//! # qe-06-consensus
//!
//! Consensus Coordinator: collects validator votes over blocks that carry
//! seismic entropy, public transfers and private transfer proofs.
//!
//! ## State machine
//!
//! ```text
//! Proposed ──vote──→ Voting ──quorum──→ Finalized
//!     │                 │
//!     └── deadline ─────┴──→ TimedOut (votes released)
//!                       └──→ Rejected (commit refused or superseded)
//! ```
//!
//! ## Finalization
//!
//! Quorum commits, under one lock sequence:
//!
//! 1. the quantum rotation folding the block's entropy records
//! 2. the ledger delta of every transaction, in block order
//! 3. the nullifiers of every private transfer
//!
//! Either all three land or none do.
//!
//! ## Votes
//!
//! Ed25519 over `("qe/vote/v1", block_hash, height)`. Quorum is
//! [`QuorumRule::SuperMajority`] (⌊2n/3⌋ + 1) or a fixed count.

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{decode_message, encode_message, InMemoryGossip};
pub use domain::{
    vote_signing_bytes, Block, ConsensusConfig, ConsensusError, ConsensusProof, ConsensusResult,
    ProposalId, ProposalStatus, QuorumRule, Transaction, ValidatorInfo, ValidatorSet, Vote,
    VoteOutcome,
};
pub use ports::{ConsensusApi, GossipError, GossipMessage, GossipNetwork};
pub use service::{ConsensusCoordinator, ConsensusDependencies};
