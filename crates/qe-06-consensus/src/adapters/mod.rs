//! Adapters for the Consensus Coordinator

mod memory;
mod wire;

pub use memory::InMemoryGossip;
pub use wire::{decode_message, encode_message};
