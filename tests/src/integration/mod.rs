//! # Integration Flows
//!
//! Each module drives a fully assembled [`node_runtime::InMemoryEngine`]
//! through one cross-subsystem flow:
//!
//! | Module | Flow |
//! |--------|------|
//! | `rotation` | seismic records → validator → quantum state rotation |
//! | `privacy_flow` | proof → nullifier registry → ledger, including replay |
//! | `quorum` | propose → votes → finalize or time out |
//! | `ledger_flow` | balance checks and supply conservation |
//! | `replay_race` | concurrent consumption of one nullifier |
//! | `pipeline` | feed → pump → producer → finalized block |

mod ledger_flow;
mod pipeline;
mod privacy_flow;
mod quorum;
mod replay_race;
mod rotation;
