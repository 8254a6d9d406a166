//! Quorum finalization across a seven-validator set.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use qe_05_ledger::LedgerApi;
    use qe_06_consensus::{ConsensusApi, ConsensusError, ProposalStatus, QuorumRule, VoteOutcome};
    use std::time::Duration;

    fn seven_validators() -> TestEngine {
        EngineBuilder::new()
            .validators(7)
            .quorum(QuorumRule::Fixed(5))
            .vote_timeout(Duration::from_secs(3))
            .build()
    }

    #[tokio::test]
    async fn test_five_of_seven_finalizes() {
        let t = seven_validators();
        let block = t.block(
            vec![public(ALICE, BOB, 10, GENESIS_EPOCH)],
            vec![record(1_000, 6.2)],
        );

        let id = t.propose(&block).await.unwrap();
        let outcomes = t.vote(id, &block, 0..5).await;
        assert_eq!(
            outcomes.last(),
            Some(&VoteOutcome::Counted { votes: 5, required: 5 })
        );
        let proof = t.finalize(id).await.unwrap();

        assert_eq!(proof.votes.len(), 5);
        assert!(proof.verify(t.engine.consensus.validators(), 5));
        assert_eq!(proof.participation.count_ones(), 5);
        assert_eq!(t.engine.consensus.status(id), Some(ProposalStatus::Finalized));
        assert_eq!(t.engine.consensus.finalized_height(), 1);
        assert_eq!(t.engine.ledger.balance_of(&ALICE), 90);
        assert_eq!(t.engine.ledger.balance_of(&BOB), 60);
        assert_eq!(t.epoch(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_four_of_seven_times_out_without_effects() {
        let t = seven_validators();
        let block = t.block(
            vec![public(ALICE, BOB, 10, GENESIS_EPOCH)],
            vec![record(1_000, 6.2)],
        );

        let err = t.run_round(&block, 0..4).await.unwrap_err();

        assert_eq!(err, ConsensusError::TimedOut { votes: 4, required: 5 });
        assert_eq!(t.engine.ledger.balance_of(&ALICE), 100);
        assert_eq!(t.engine.ledger.balance_of(&BOB), 50);
        assert_eq!(t.epoch(), GENESIS_EPOCH);
        assert_eq!(t.engine.consensus.finalized_height(), 0);
        assert_eq!(t.event_count("block_timed_out"), 1);
        assert_eq!(t.event_count("block_finalized"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_timeout_finalizes_same_block() {
        let t = seven_validators();
        let block = t.block(vec![public(ALICE, BOB, 10, GENESIS_EPOCH)], vec![]);

        assert!(t.run_round(&block, 0..4).await.is_err());
        let proof = t.run_round(&block, 0..5).await.unwrap();

        assert_eq!(proof.height, 1);
        assert_eq!(t.engine.ledger.balance_of(&ALICE), 90);
    }

    #[tokio::test]
    async fn test_quorum_reached_across_tasks() {
        let t = seven_validators();
        let block = t.block(vec![], vec![]);
        let id = t.propose(&block).await.unwrap();

        let consensus = std::sync::Arc::clone(&t.engine.consensus);
        let waiter = tokio::spawn(async move {
            let ctx = shared_types::CallContext::read_write();
            consensus.try_finalize(&ctx, id).await
        });
        tokio::task::yield_now().await;

        t.vote(id, &block, 2..7).await;
        let proof = waiter.await.unwrap().unwrap();

        assert_eq!(proof.votes.len(), 5);
        assert!(!proof.participation[0]);
        assert!(proof.participation[6]);
    }
}
