//! Private transfers: proof verification, nullifier consumption, ledger.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use qe_02_quantum_state::QuantumStateApi;
    use qe_03_nullifier_registry::NullifierRegistryApi;
    use qe_04_privacy_proofs::{PrivacyProofApi, ProofError};
    use qe_05_ledger::{LedgerApi, Transfer};
    use qe_06_consensus::{ConsensusApi, ConsensusError};
    use shared_types::CallContext;

    #[test]
    fn test_private_transfer_applies_once() {
        let t = EngineBuilder::new().build();
        let proof = private_proof(1, 30, ALICE, BOB, GENESIS_EPOCH);
        let ctx = CallContext::read_write().with_live_epoch(GENESIS_EPOCH);

        let verified = t
            .engine
            .privacy
            .verify(&ctx, &proof, GENESIS_EPOCH)
            .unwrap();
        assert_eq!(verified.nullifier(), proof.nullifier);
        t.engine
            .ledger
            .apply(&ctx, Transfer::Private(verified))
            .unwrap();

        assert_eq!(t.engine.ledger.balance_of(&ALICE), 70);
        assert_eq!(t.engine.ledger.balance_of(&BOB), 80);

        let replay = t.engine.privacy.verify(&ctx, &proof, GENESIS_EPOCH);
        assert_eq!(replay.unwrap_err(), ProofError::Replayed(proof.nullifier));
        assert_eq!(t.engine.ledger.balance_of(&ALICE), 70);
        assert_eq!(t.engine.ledger.balance_of(&BOB), 80);
        assert_eq!(t.engine.registry.consumed_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_replayed_proof_rejected_in_next_block() {
        let t = EngineBuilder::new().build();
        let proof = private_proof(2, 25, ALICE, BOB, GENESIS_EPOCH);

        let first = t.block(vec![qe_06_consensus::Transaction::Private(proof.clone())], vec![]);
        t.run_round(&first, 0..3).await.unwrap();
        assert_eq!(t.engine.ledger.balance_of(&BOB), 75);

        let second = t.block(vec![qe_06_consensus::Transaction::Private(proof)], vec![]);
        let err = t.propose(&second).await.unwrap_err();

        assert!(matches!(err, ConsensusError::InvalidTransaction { index: 0, .. }));
        assert_eq!(t.engine.ledger.balance_of(&ALICE), 75);
        assert_eq!(t.engine.ledger.balance_of(&BOB), 75);
        assert_eq!(t.engine.consensus.finalized_height(), 1);
        assert_eq!(t.event_count("block_rejected"), 1);
    }

    #[tokio::test]
    async fn test_same_nullifier_twice_in_one_block_rejected() {
        let t = EngineBuilder::new().build();
        let proof = private_proof(3, 10, ALICE, BOB, GENESIS_EPOCH);
        let block = t.block(
            vec![
                qe_06_consensus::Transaction::Private(proof.clone()),
                qe_06_consensus::Transaction::Private(proof.clone()),
            ],
            vec![],
        );

        let err = t.propose(&block).await.unwrap_err();

        assert!(matches!(err, ConsensusError::InvalidTransaction { index: 1, .. }));
        assert!(!t.engine.registry.is_consumed(&proof.nullifier).unwrap());
    }

    #[test]
    fn test_proof_within_lag_accepted_stale_refused_unconsumed() {
        let t = EngineBuilder::new().build();
        let lagging = private_proof(4, 5, ALICE, BOB, GENESIS_EPOCH);
        let stale = private_proof(5, 5, ALICE, BOB, GENESIS_EPOCH);

        let rotate = |ts| {
            let ctx = CallContext::read_write();
            t.engine
                .quantum
                .propose_rotation(&ctx, vec![t.validated(record(ts, 6.2))])
                .unwrap();
        };

        rotate(1_000);
        rotate(1_001);
        assert_eq!(t.epoch(), 7);
        let ctx = CallContext::read_write().with_live_epoch(7);
        assert!(t.engine.privacy.verify(&ctx, &lagging, 7).is_ok());

        rotate(1_002);
        let ctx = CallContext::read_write().with_live_epoch(8);
        assert!(matches!(
            t.engine.privacy.verify(&ctx, &stale, 8),
            Err(ProofError::StaleEpoch { bound: 5, current: 8, lag: 2 })
        ));
        assert!(!t.engine.registry.is_consumed(&stale.nullifier).unwrap());
    }

    #[test]
    fn test_tampered_public_inputs_refused_unconsumed() {
        let t = EngineBuilder::new().build();
        let mut proof = private_proof(6, 10, ALICE, BOB, GENESIS_EPOCH);
        proof.public_inputs.amount = 1;
        let ctx = CallContext::read_write().with_live_epoch(GENESIS_EPOCH);

        assert!(matches!(
            t.engine.privacy.verify(&ctx, &proof, GENESIS_EPOCH),
            Err(ProofError::InvalidProof { .. })
        ));
        assert!(!t.engine.registry.is_consumed(&proof.nullifier).unwrap());
    }
}
