//! Driven ports (Outbound dependencies)

use crate::domain::{Block, ProposalId, Vote};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Messages exchanged between validators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GossipMessage {
    Proposal { id: ProposalId, block: Block },
    Vote { proposal_id: ProposalId, vote: Vote },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GossipError {
    #[error("Wire encoding failed: {0}")]
    Codec(String),

    #[error("Network unavailable: {0}")]
    Unavailable(String),
}

/// Validator network. Delivery is at-least-once and may reorder.
#[async_trait]
pub trait GossipNetwork: Send + Sync {
    async fn broadcast(&self, message: GossipMessage) -> Result<(), GossipError>;
}
