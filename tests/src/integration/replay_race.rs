//! Concurrent attempts to spend one nullifier.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use qe_03_nullifier_registry::{NullifierRegistryApi, ReplayError};
    use qe_04_privacy_proofs::{PrivacyProofApi, ProofError};
    use qe_05_ledger::{LedgerApi, Transfer};
    use shared_types::{CallContext, Nullifier};
    use std::sync::{Arc, Barrier};
    use std::thread;

    const CONTENDERS: usize = 16;

    #[test]
    fn test_concurrent_consume_exactly_one_wins() {
        let t = EngineBuilder::new().build();
        let nullifier = Nullifier::from_bytes([7; 32]);
        let barrier = Arc::new(Barrier::new(CONTENDERS));

        let handles: Vec<_> = (0..CONTENDERS)
            .map(|_| {
                let registry = Arc::clone(&t.engine.registry);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    registry.try_consume(nullifier)
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| *e == ReplayError::AlreadyUsed(nullifier)));
        assert_eq!(t.engine.registry.consumed_count().unwrap(), 1);
    }

    #[test]
    fn test_concurrent_private_spends_move_funds_once() {
        let t = EngineBuilder::new().build();
        let proof = Arc::new(private_proof(9, 40, ALICE, BOB, GENESIS_EPOCH));
        let barrier = Arc::new(Barrier::new(CONTENDERS));

        let handles: Vec<_> = (0..CONTENDERS)
            .map(|_| {
                let engine = Arc::clone(&t.engine);
                let proof = Arc::clone(&proof);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let ctx = CallContext::read_write().with_live_epoch(GENESIS_EPOCH);
                    barrier.wait();
                    let verified = engine.privacy.verify(&ctx, &proof, GENESIS_EPOCH)?;
                    engine
                        .ledger
                        .apply(&ctx, Transfer::Private(verified))
                        .map_err(|e| ProofError::Storage(e.to_string()))?;
                    Ok::<_, ProofError>(())
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, ProofError::Replayed(_))));
        assert_eq!(t.engine.ledger.balance_of(&ALICE), 60);
        assert_eq!(t.engine.ledger.balance_of(&BOB), 90);
        assert_eq!(t.engine.ledger.sum_of_balances(), 150);
    }
}
