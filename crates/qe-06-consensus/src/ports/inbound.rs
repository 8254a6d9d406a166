//! Driving ports (Inbound API)

use crate::domain::{Block, ConsensusProof, ConsensusResult, ProposalId, ProposalStatus, Vote, VoteOutcome};
use async_trait::async_trait;
use shared_types::CallContext;

/// Primary Consensus API
#[async_trait]
pub trait ConsensusApi: Send + Sync {
    /// Validate a block and open a voting round for it.
    ///
    /// Any failing check rejects the whole block before voting. Proposing a
    /// block whose hash is already live or finalized returns the existing id.
    async fn propose(&self, ctx: &CallContext, block: Block) -> ConsensusResult<ProposalId>;

    /// Count a validator vote. Duplicates and late votes never count twice.
    async fn vote(&self, proposal_id: ProposalId, vote: Vote) -> ConsensusResult<VoteOutcome>;

    /// Wait for quorum until the deadline, then commit rotation, ledger
    /// delta and nullifiers together.
    ///
    /// Resolves to `TimedOut` once the deadline passes. Dropping the future
    /// abandons the wait without side effects.
    async fn try_finalize(
        &self,
        ctx: &CallContext,
        proposal_id: ProposalId,
    ) -> ConsensusResult<ConsensusProof>;

    fn status(&self, proposal_id: ProposalId) -> Option<ProposalStatus>;

    /// Height of the last finalized block (0 before the first).
    fn finalized_height(&self) -> u64;
}
