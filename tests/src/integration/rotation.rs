//! Entropy rotation through blocks and through the state manager directly.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use qe_01_entropy_feed::EntropyError;
    use qe_02_quantum_state::{QuantumError, QuantumStateApi};
    use qe_05_ledger::LedgerApi;
    use shared_types::CallContext;

    #[tokio::test]
    async fn test_block_with_seismic_record_advances_epoch() {
        let t = EngineBuilder::new().build();
        let before = t.engine.quantum.fingerprint_at(GENESIS_EPOCH).unwrap();

        let block = t.block(vec![], vec![record(1_000, 6.2)]);
        let proof = t.run_round(&block, 0..3).await.unwrap();

        assert_eq!(proof.epoch, 6);
        assert_eq!(t.epoch(), 6);
        let after = t.engine.quantum.fingerprint_at(6).unwrap();
        assert_ne!(before, after);
        // History keeps the previous epoch for lagging proofs
        assert_eq!(t.engine.quantum.fingerprint_at(GENESIS_EPOCH), Some(before));
        assert_eq!(t.event_count("rotation_accepted"), 1);
        assert_eq!(t.event_count("block_finalized"), 1);
    }

    #[test]
    fn test_direct_rotation_then_refold_is_duplicate() {
        let t = EngineBuilder::new().build();
        let ctx = CallContext::read_write();

        let state = t
            .engine
            .quantum
            .propose_rotation(&ctx, vec![t.validated(record(1_000, 6.2))])
            .unwrap();
        assert_eq!(state.epoch(), 6);
        assert_eq!(ctx.events().count("rotation_accepted"), 1);

        let refold = t
            .engine
            .quantum
            .with_pool(|pool| t.engine.feed.validate(record(1_000, 6.2), pool));
        assert!(matches!(refold, Err(EntropyError::Duplicate { .. })));
        assert_eq!(t.epoch(), 6);
    }

    #[test]
    fn test_insufficient_entropy_leaves_state_untouched() {
        let t = EngineBuilder::new()
            .configure(|config| config.quantum.min_entropy_bits = 1_024)
            .build();
        let ctx = CallContext::read_write();

        let result = t
            .engine
            .quantum
            .propose_rotation(&ctx, vec![t.validated(record(1_000, 6.2))]);

        assert!(matches!(
            result,
            Err(QuantumError::InsufficientEntropy { required: 1_024, .. })
        ));
        assert_eq!(t.epoch(), GENESIS_EPOCH);
        assert_eq!(ctx.events().count("rotation_rejected"), 1);
    }

    #[test]
    fn test_stale_and_future_records_refused() {
        let t = EngineBuilder::new().build();
        t.clock.set(NOW + 10_000);

        let stale = t
            .engine
            .quantum
            .with_pool(|pool| t.engine.feed.validate(record(1_000, 6.2), pool));
        assert!(matches!(stale, Err(EntropyError::Stale { .. })));

        let future = t
            .engine
            .quantum
            .with_pool(|pool| t.engine.feed.validate(record(NOW + 20_000, 6.2), pool));
        assert!(matches!(future, Err(EntropyError::FutureDated { .. })));
    }

    #[tokio::test]
    async fn test_block_with_foreign_record_rejected_whole() {
        let t = EngineBuilder::new().build();
        let forged = qe_01_entropy_feed::SeismicRecord::unsigned(SOURCE, 1_000, 0.0, 0.0, 4.0, 8.0)
            .signed_by(&validator_key(0));

        let block = t.block(
            vec![public(ALICE, BOB, 10, GENESIS_EPOCH)],
            vec![record(1_001, 5.0), forged],
        );
        let err = t.propose(&block).await.unwrap_err();

        assert!(matches!(
            err,
            qe_06_consensus::ConsensusError::InvalidEntropy { index: 1, .. }
        ));
        assert_eq!(t.epoch(), GENESIS_EPOCH);
        assert_eq!(t.engine.ledger.balance_of(&ALICE), 100);
    }
}
