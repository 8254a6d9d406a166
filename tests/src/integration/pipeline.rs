//! Feed to finality through the runtime tasks.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use node_runtime::adapters::FileSeismicFeed;
    use node_runtime::container::{FeedSource, PumpMode};
    use node_runtime::handlers::{BlockProducer, EntropyPump, PollOutcome};
    use node_runtime::NodeRuntime;
    use qe_01_entropy_feed::{encode_feed_batch, StaticSeismicFeed};
    use qe_05_ledger::LedgerApi;
    use qe_06_consensus::{ConsensusApi, Transaction};
    use std::sync::Arc;
    use std::time::Duration;

    fn single_validator() -> EngineBuilder {
        EngineBuilder::new().validators(1)
    }

    #[tokio::test]
    async fn test_feed_records_and_transfer_finalize_in_one_block() {
        let t = single_validator().build();
        let feed = Arc::new(StaticSeismicFeed::new(vec![
            record(1_000, 6.2),
            record(1_060, 3.4),
        ]));
        let mut pump = EntropyPump::new(Arc::clone(&t.engine), feed);

        assert_eq!(
            pump.poll_once().await,
            PollOutcome::Fetched {
                accepted: 2,
                rejected: 0,
                rotated: None,
            }
        );
        t.engine
            .transactions
            .submit(public(ALICE, CAROL, 25, GENESIS_EPOCH));
        t.engine
            .transactions
            .submit(Transaction::Private(private_proof(1, 5, BOB, CAROL, GENESIS_EPOCH)));

        let producer = BlockProducer::new(Arc::clone(&t.engine), validator_key(0));
        let proof = producer.produce_once().await.unwrap().unwrap();

        assert_eq!(proof.height, 1);
        assert_eq!(proof.epoch, GENESIS_EPOCH + 1);
        assert_eq!(t.engine.ledger.balance_of(&CAROL), 30);
        assert_eq!(t.engine.ledger.total_supply(), 150);
        assert!(t.engine.pending_entropy.is_empty());
        assert!(t.engine.transactions.is_empty());

        assert_eq!(t.event_count("rotation_accepted"), 1);
        assert_eq!(t.event_count("transfer_applied"), 2);
        assert_eq!(t.event_count("block_finalized"), 1);
    }

    #[tokio::test]
    async fn test_rotate_mode_pump_then_block_at_new_epoch() {
        let t = single_validator()
            .configure(|config| config.pump.mode = PumpMode::Rotate)
            .build();
        let feed = Arc::new(StaticSeismicFeed::new(vec![record(1_000, 6.2)]));
        let mut pump = EntropyPump::new(Arc::clone(&t.engine), feed.clone());

        assert!(matches!(
            pump.poll_once().await,
            PollOutcome::Fetched { rotated: Some(6), .. }
        ));

        // Transactions may not predate the block epoch
        t.engine
            .transactions
            .submit(public(ALICE, BOB, 1, GENESIS_EPOCH + 1));
        let producer = BlockProducer::new(Arc::clone(&t.engine), validator_key(0));
        let proof = producer.produce_once().await.unwrap().unwrap();

        assert_eq!(proof.epoch, 6);
        assert_eq!(t.engine.ledger.balance_of(&BOB), 51);
    }

    #[tokio::test]
    async fn test_file_feed_drives_pump() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        std::fs::write(
            &path,
            encode_feed_batch(&[record(1_000, 6.2), record(1_500, 2.0)]).unwrap(),
        )
        .unwrap();

        let t = single_validator().build();
        let feed = Arc::new(FileSeismicFeed::new(path));
        let mut pump = EntropyPump::new(Arc::clone(&t.engine), feed);

        assert!(matches!(
            pump.poll_once().await,
            PollOutcome::Fetched { accepted: 2, .. }
        ));
        assert_eq!(pump.cursor(), 1_500);
        assert_eq!(t.engine.pending_entropy.len(), 2);
    }

    #[tokio::test]
    async fn test_runtime_produces_until_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        std::fs::write(&path, encode_feed_batch(&[record(1_000, 6.2)]).unwrap()).unwrap();

        let t = single_validator()
            .configure(move |config| {
                config.pump.feed = FeedSource::File { path };
                config.pump.poll_interval_ms = 10;
                config.producer.enabled = true;
                config.producer.block_interval_ms = 10;
                config.producer.validator_seed = Some(hex::encode([1u8; 32]));
            })
            .build();

        let mut runtime = NodeRuntime::new(Arc::clone(&t.engine));
        runtime.start().unwrap();

        for _ in 0..100 {
            if t.engine.consensus.finalized_height() >= 1 && t.epoch() > GENESIS_EPOCH {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        runtime.shutdown().await;

        assert!(t.engine.consensus.finalized_height() >= 1);
        assert_eq!(t.epoch(), GENESIS_EPOCH + 1);
    }
}
