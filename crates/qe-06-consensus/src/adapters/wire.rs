//! Gossip wire encoding (bincode)

use crate::ports::{GossipError, GossipMessage};

pub fn encode_message(message: &GossipMessage) -> Result<Vec<u8>, GossipError> {
    bincode::serialize(message).map_err(|e| GossipError::Codec(e.to_string()))
}

pub fn decode_message(bytes: &[u8]) -> Result<GossipMessage, GossipError> {
    bincode::deserialize(bytes).map_err(|e| GossipError::Codec(e.to_string()))
}
