//! Ports layer (Hexagonal Architecture)

mod inbound;

pub use inbound::*;
