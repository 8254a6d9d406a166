//! # Quantum-Entropy Engine Benchmarks
//!
//! Hot paths per subsystem:
//!
//! | Subsystem | Path | Target |
//! |-----------|------|--------|
//! | qe-01 Entropy Feed | signature + range validation | < 100µs per record |
//! | qe-02 Quantum State | rotation over a batch | < 1ms for 64 records |
//! | qe-03 Nullifier Registry | try_consume | < 10µs |
//! | qe-04 Privacy Proofs | transcript verify + consume | < 50µs |
//! | qe-06 Consensus | block hash | < 1ms for 1000 tx |

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use qe_01_entropy_feed::RecordKey;
use qe_02_quantum_state::{QuantumConfig, QuantumStateApi, QuantumStateManager};
use qe_03_nullifier_registry::{InMemoryNullifierStore, NullifierRegistry, NullifierRegistryApi};
use qe_04_privacy_proofs::{
    PrivacyConfig, PrivacyProofApi, PrivacyProofVerifier, ProofBackend, TranscriptBackend,
};
use qe_06_consensus::Block;
use qe_tests::fixtures::{self, EngineBuilder, ALICE, BOB, GENESIS_EPOCH, PROOF_KEY};
use rand::Rng;
use shared_types::{CallContext, Nullifier};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// QE-01: record validation
// ============================================================================

fn bench_record_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("qe-01-entropy-feed");
    group.measurement_time(Duration::from_secs(5));

    let t = EngineBuilder::new().build();
    let record = fixtures::record(1_000, 6.2);
    let none = HashSet::<RecordKey>::new();

    group.bench_function("validate_record", |b| {
        b.iter(|| black_box(t.engine.feed.validate(record.clone(), &none).is_ok()))
    });

    group.finish();
}

// ============================================================================
// QE-02: rotation
// ============================================================================

fn bench_rotation(c: &mut Criterion) {
    let mut group = c.benchmark_group("qe-02-quantum-state");
    group.measurement_time(Duration::from_secs(5));

    let t = EngineBuilder::new().build();
    for size in [1usize, 16, 64] {
        let batch: Vec<_> = (0..size as u64)
            .map(|i| t.validated_fresh(fixtures::record(1_000 + i, 4.0)))
            .collect();

        group.bench_with_input(BenchmarkId::new("rotate", size), &batch, |b, batch| {
            b.iter_batched(
                || QuantumStateManager::with_genesis(QuantumConfig::default(), GENESIS_EPOCH),
                |manager| {
                    let ctx = CallContext::read_write();
                    black_box(manager.propose_rotation(&ctx, batch.clone()).is_ok())
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

// ============================================================================
// QE-03 / QE-04: replay protection and proof verification
// ============================================================================

fn bench_nullifiers_and_proofs(c: &mut Criterion) {
    let mut group = c.benchmark_group("qe-03-qe-04-privacy");
    group.measurement_time(Duration::from_secs(5));

    let registry = NullifierRegistry::new(InMemoryNullifierStore::new());
    let mut rng = rand::thread_rng();
    group.bench_function("try_consume_fresh", |b| {
        b.iter(|| {
            let mut bytes = [0u8; 32];
            rng.fill(&mut bytes);
            black_box(registry.try_consume(Nullifier::from_bytes(bytes)).is_ok())
        })
    });

    group.bench_function("verify_private_transfer", |b| {
        b.iter_batched(
            || {
                let registry = Arc::new(NullifierRegistry::new(InMemoryNullifierStore::new()));
                let verifier = PrivacyProofVerifier::new(
                    registry,
                    ProofBackend::Transcript(TranscriptBackend::new(PROOF_KEY)),
                    PrivacyConfig::default(),
                );
                (verifier, fixtures::private_proof(1, 10, ALICE, BOB, GENESIS_EPOCH))
            },
            |(verifier, proof)| {
                let ctx = CallContext::read_write();
                black_box(verifier.verify(&ctx, &proof, GENESIS_EPOCH).is_ok())
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

// ============================================================================
// QE-06: block hashing
// ============================================================================

fn bench_block_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("qe-06-consensus");
    group.measurement_time(Duration::from_secs(5));

    let t = EngineBuilder::new().build();
    for size in [10usize, 100, 1_000] {
        let transactions = (0..size)
            .map(|i| fixtures::public(ALICE, BOB, i as u128, GENESIS_EPOCH))
            .collect();
        let block: Block = t.block(transactions, vec![fixtures::record(1_000, 6.2)]);

        group.bench_with_input(BenchmarkId::new("block_hash", size), &block, |b, block| {
            b.iter(|| black_box(block.hash()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_record_validation,
    bench_rotation,
    bench_nullifiers_and_proofs,
    bench_block_hash,
);

criterion_main!(benches);
