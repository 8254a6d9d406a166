use super::*;
use crate::domain::PublicTransfer;
use qe_03_nullifier_registry::{InMemoryNullifierStore, NullifierRegistry};
use qe_04_privacy_proofs::{
    prove_transfer, Blinding, PrivacyConfig, PrivacyProofApi, PrivacyProofVerifier, ProofBackend,
    SpendSecret, TranscriptBackend, Witness,
};
use shared_types::Epoch;
use std::sync::Arc;
use std::thread;

const ALICE: Address = [0xA1; 20];
const BOB: Address = [0xB0; 20];
const CAROL: Address = [0xC4; 20];
const EPOCH: Epoch = 10;
const KEY: [u8; 32] = [0x42; 32];

fn ledger() -> TransactionLedger {
    TransactionLedger::with_genesis(LedgerConfig::default(), [(ALICE, 100), (BOB, 60)]).unwrap()
}

fn ctx() -> CallContext {
    CallContext::read_write().with_live_epoch(EPOCH)
}

fn public(from: Address, to: Address, amount: u128) -> Transfer {
    Transfer::Public(PublicTransfer {
        from,
        to,
        amount,
        epoch: EPOCH,
    })
}

fn intent(from: Address, to: Address, amount: u128) -> TransferIntent {
    TransferIntent::Public(PublicTransfer {
        from,
        to,
        amount,
        epoch: EPOCH,
    })
}

#[test]
fn test_overdraft_is_refused_without_changes() {
    let ledger = ledger();
    let ctx = ctx();

    let err = ledger.apply(&ctx, public(ALICE, BOB, 150)).unwrap_err();

    assert_eq!(
        err,
        LedgerError::InsufficientBalance {
            account: ALICE,
            required: 150,
            available: 100,
        }
    );
    assert_eq!(ledger.balance_of(&ALICE), 100);
    assert_eq!(ledger.balance_of(&BOB), 60);
    assert!(ctx.events().is_empty());
    assert!(!ctx.is_entered());
}

#[test]
fn test_public_transfer_moves_balance_and_emits() {
    let ledger = ledger();
    let ctx = ctx();

    let applied = ledger.apply(&ctx, public(ALICE, CAROL, 40)).unwrap();

    assert_eq!(applied.sender_balance, 60);
    assert_eq!(applied.recipient_balance, 40);
    assert_eq!(ledger.balance_of(&ALICE), 60);
    assert_eq!(ledger.balance_of(&CAROL), 40);
    assert_eq!(ledger.total_supply(), 160);
    assert_eq!(ledger.sum_of_balances(), 160);
    assert_eq!(ctx.events().count("transfer_applied"), 1);
}

#[test]
fn test_read_only_context_may_simulate_but_not_apply() {
    let ledger = ledger();
    let ctx = CallContext::read_only().with_live_epoch(EPOCH);

    assert_eq!(
        ledger.apply(&ctx, public(ALICE, BOB, 1)),
        Err(LedgerError::ReadOnlyContext)
    );
    let simulated = ledger.simulate(&ctx, &[intent(ALICE, BOB, 1)]).unwrap();
    assert_eq!(simulated[0].sender_balance, 99);
    assert_eq!(ledger.balance_of(&ALICE), 100);
}

#[test]
fn test_nested_mutation_is_reentrancy() {
    let ledger = ledger();
    let ctx = ctx();

    let _outer = ctx.enter().unwrap();
    assert_eq!(
        ledger.apply(&ctx, public(ALICE, BOB, 1)),
        Err(LedgerError::Reentrancy)
    );
    assert_eq!(ledger.balance_of(&ALICE), 100);
}

#[test]
fn test_open_batch_blocks_nested_apply_on_same_context() {
    let ledger = ledger();
    let ctx = ctx();
    let other = CallContext::read_write();

    let batch = ledger.begin_batch(&ctx).unwrap();
    assert!(ctx.is_entered());
    assert!(!other.is_entered());
    drop(batch);

    assert!(ledger.apply(&ctx, public(ALICE, BOB, 1)).is_ok());
}

#[test]
fn test_stale_public_transfer_is_refused() {
    let ledger = ledger();
    let ctx = ctx();
    let stale = Transfer::Public(PublicTransfer {
        from: ALICE,
        to: BOB,
        amount: 1,
        epoch: EPOCH - 3,
    });

    assert_eq!(
        ledger.apply(&ctx, stale),
        Err(LedgerError::StaleEpoch {
            epoch: EPOCH - 3,
            live: EPOCH,
            lag: 2,
        })
    );
}

#[test]
fn test_recipient_overflow_is_refused() {
    let ledger = TransactionLedger::with_genesis(
        LedgerConfig::default(),
        [(ALICE, 10), (BOB, u128::MAX - 5)],
    )
    .unwrap();

    assert_eq!(
        ledger.apply(&ctx(), public(ALICE, BOB, 10)),
        Err(LedgerError::Overflow { account: BOB })
    );
    assert_eq!(ledger.balance_of(&ALICE), 10);
}

#[test]
fn test_genesis_supply_overflow_is_refused() {
    let result = TransactionLedger::with_genesis(
        LedgerConfig::default(),
        [(ALICE, u128::MAX), (BOB, 1)],
    );
    assert!(matches!(result, Err(LedgerError::Overflow { .. })));
}

#[test]
fn test_batch_commits_all_or_discards_all() {
    let ledger = ledger();
    let ctx = ctx();

    {
        let mut batch = ledger.begin_batch(&ctx).unwrap();
        batch.stage(&public(ALICE, CAROL, 70)).unwrap();
        assert!(batch.stage(&public(ALICE, CAROL, 70)).is_err());
        assert_eq!(batch.staged().len(), 1);
        assert_eq!(batch.balance_of(&ALICE), 30);
        // Dropped without commit
    }
    assert_eq!(ledger.balance_of(&ALICE), 100);
    assert!(ctx.events().is_empty());

    let mut batch = ledger.begin_batch(&ctx).unwrap();
    batch.stage(&public(ALICE, CAROL, 70)).unwrap();
    batch.stage(&public(CAROL, BOB, 20)).unwrap();
    let applied = batch.commit();

    assert_eq!(applied.len(), 2);
    assert_eq!(ledger.balance_of(&CAROL), 50);
    assert_eq!(ledger.balance_of(&BOB), 80);
    assert_eq!(ctx.events().count("transfer_applied"), 2);
    assert_eq!(ledger.sum_of_balances(), ledger.total_supply());
}

#[test]
fn test_simulation_reports_failing_index() {
    let ledger = ledger();
    let ctx = ctx();

    // BOB holds 60; receiving 100 first makes the 150 spend possible
    let ok = ledger.simulate(&ctx, &[intent(ALICE, BOB, 100), intent(BOB, CAROL, 150)]);
    assert_eq!(ok.unwrap()[1].recipient_balance, 150);

    let failure = ledger
        .simulate(&ctx, &[intent(BOB, CAROL, 150), intent(ALICE, BOB, 100)])
        .unwrap_err();
    assert_eq!(failure.index, 0);
    assert_eq!(failure.error.reason(), "insufficient_balance");
    assert_eq!(ledger.balance_of(&CAROL), 0);
}

#[test]
fn test_private_transfer_requires_verified_proof() {
    let ledger = ledger();
    let ctx = ctx();
    let verifier = PrivacyProofVerifier::new(
        Arc::new(NullifierRegistry::new(InMemoryNullifierStore::new())),
        ProofBackend::Transcript(TranscriptBackend::new(KEY)),
        PrivacyConfig::default(),
    );
    let witness = Witness {
        amount: 25,
        blinding: Blinding([3u8; 32]),
        spend_secret: SpendSecret([4u8; 32]),
    };
    let proof = prove_transfer(&TranscriptBackend::new(KEY), &witness, ALICE, CAROL, EPOCH).unwrap();

    let verified = verifier.verify(&ctx, &proof, EPOCH).unwrap();
    let applied = ledger.apply(&ctx, Transfer::Private(verified)).unwrap();

    assert_eq!(applied.leg.kind, TransferKind::Private);
    assert_eq!(ledger.balance_of(&ALICE), 75);
    assert_eq!(ledger.balance_of(&CAROL), 25);
}

#[test]
fn test_concurrent_transfers_conserve_supply() {
    let ledger = Arc::new(
        TransactionLedger::with_genesis(
            LedgerConfig::default(),
            [(ALICE, 1_000), (BOB, 1_000), (CAROL, 1_000)],
        )
        .unwrap(),
    );
    let accounts = [ALICE, BOB, CAROL];

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                let ctx = ctx();
                for n in 0..50u128 {
                    let from = accounts[(i + n as usize) % 3];
                    let to = accounts[(i + n as usize + 1) % 3];
                    // Some of these overdraw and are refused
                    let _ = ledger.apply(&ctx, public(from, to, n * 7));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(ledger.total_supply(), 3_000);
    assert_eq!(ledger.sum_of_balances(), 3_000);
}
