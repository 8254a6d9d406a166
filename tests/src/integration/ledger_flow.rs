//! Balance checks and supply conservation.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use qe_05_ledger::{LedgerApi, LedgerError, PublicTransfer, Transfer};
    use qe_06_consensus::ConsensusError;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use shared_types::{Address, CallContext};

    fn transfer(from: Address, to: Address, amount: u128) -> Transfer {
        Transfer::Public(PublicTransfer {
            from,
            to,
            amount,
            epoch: GENESIS_EPOCH,
        })
    }

    #[test]
    fn test_overdraft_refused_without_effect() {
        let t = EngineBuilder::new().build();
        let ctx = CallContext::read_write().with_live_epoch(GENESIS_EPOCH);

        let err = t
            .engine
            .ledger
            .apply(&ctx, transfer(ALICE, BOB, 150))
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                account: ALICE,
                required: 150,
                available: 100,
            }
        );
        assert_eq!(t.engine.ledger.balance_of(&ALICE), 100);
        assert_eq!(t.engine.ledger.balance_of(&BOB), 50);
        assert!(ctx.events().is_empty());
    }

    #[tokio::test]
    async fn test_overdraft_in_block_rejects_block() {
        let t = EngineBuilder::new().build();
        let block = t.block(
            vec![
                public(ALICE, BOB, 60, GENESIS_EPOCH),
                public(ALICE, CAROL, 60, GENESIS_EPOCH),
            ],
            vec![],
        );

        let err = t.propose(&block).await.unwrap_err();

        assert!(matches!(err, ConsensusError::InvalidTransaction { index: 1, .. }));
        assert_eq!(t.engine.ledger.balance_of(&ALICE), 100);
        assert_eq!(t.engine.ledger.balance_of(&CAROL), 0);
    }

    #[test]
    fn test_read_only_context_cannot_move_funds() {
        let t = EngineBuilder::new().build();
        let ctx = CallContext::read_only().with_live_epoch(GENESIS_EPOCH);

        assert_eq!(
            t.engine.ledger.apply(&ctx, transfer(ALICE, BOB, 1)),
            Err(LedgerError::ReadOnlyContext)
        );
    }

    #[test]
    fn test_random_transfers_conserve_supply() {
        let t = EngineBuilder::new()
            .allocations(vec![(ALICE, 1_000), (BOB, 500), (CAROL, 250)])
            .build();
        let accounts = [ALICE, BOB, CAROL];
        let supply = t.engine.ledger.total_supply();
        let mut rng = StdRng::seed_from_u64(0x5EED);
        let mut applied = 0;

        for _ in 0..500 {
            let from = accounts[rng.gen_range(0..3)];
            let to = accounts[rng.gen_range(0..3)];
            let amount = rng.gen_range(0..400u128);
            let ctx = CallContext::read_write().with_live_epoch(GENESIS_EPOCH);

            let before = t.engine.ledger.balance_of(&from);
            match t.engine.ledger.apply(&ctx, transfer(from, to, amount)) {
                Ok(_) => applied += 1,
                Err(LedgerError::InsufficientBalance { available, .. }) => {
                    assert_eq!(available, before);
                    assert!(amount > before);
                }
                Err(other) => panic!("unexpected ledger error: {other}"),
            }
            assert_eq!(t.engine.ledger.sum_of_balances(), supply);
        }

        assert!(applied > 0);
        assert_eq!(t.engine.ledger.total_supply(), 1_750);
    }
}
