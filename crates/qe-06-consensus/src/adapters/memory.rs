//! In-process gossip network
//!
//! Every broadcast is encoded to wire bytes and fanned out to subscribers
//! over a tokio broadcast channel.

use super::wire::{decode_message, encode_message};
use crate::ports::{GossipError, GossipMessage, GossipNetwork};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast;

pub struct InMemoryGossip {
    sender: broadcast::Sender<Vec<u8>>,
    sent: Mutex<Vec<Vec<u8>>>,
    offline: Mutex<bool>,
}

impl InMemoryGossip {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            sent: Mutex::new(Vec::new()),
            offline: Mutex::new(false),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Vec<u8>> {
        self.sender.subscribe()
    }

    /// Decoded copies of every message broadcast so far.
    pub fn sent(&self) -> Vec<GossipMessage> {
        self.sent
            .lock()
            .iter()
            .filter_map(|bytes| decode_message(bytes).ok())
            .collect()
    }

    /// Make subsequent broadcasts fail (for testing)
    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock() = offline;
    }
}

impl Default for InMemoryGossip {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl GossipNetwork for InMemoryGossip {
    async fn broadcast(&self, message: GossipMessage) -> Result<(), GossipError> {
        if *self.offline.lock() {
            return Err(GossipError::Unavailable("network offline".into()));
        }
        let bytes = encode_message(&message)?;
        self.sent.lock().push(bytes.clone());
        // No subscribers is not an error
        let _ = self.sender.send(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProposalId, Vote};
    use shared_crypto::Ed25519KeyPair;

    fn vote_message() -> GossipMessage {
        GossipMessage::Vote {
            proposal_id: ProposalId::new(),
            vote: Vote::sign(&Ed25519KeyPair::from_seed([1u8; 32]), [2u8; 32], 1),
        }
    }

    #[tokio::test]
    async fn test_subscribers_receive_wire_bytes() {
        let gossip = InMemoryGossip::default();
        let mut rx = gossip.subscribe();
        let message = vote_message();

        gossip.broadcast(message.clone()).await.unwrap();

        let bytes = rx.recv().await.unwrap();
        assert_eq!(decode_message(&bytes).unwrap(), message);
        assert_eq!(gossip.sent(), vec![message]);
    }

    #[tokio::test]
    async fn test_offline_network_fails() {
        let gossip = InMemoryGossip::default();
        gossip.set_offline(true);
        assert!(matches!(
            gossip.broadcast(vote_message()).await,
            Err(GossipError::Unavailable(_))
        ));
        assert!(gossip.sent().is_empty());
    }
}
