//! Ports for the Consensus Coordinator

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
