//! Task supervision for a running engine.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use qe_03_nullifier_registry::NullifierStore;
use shared_crypto::Ed25519KeyPair;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::adapters::feed_from_config;
use crate::container::EngineContainer;
use crate::handlers::{BlockProducer, EntropyPump};

/// Time granted to tasks after the shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The engine plus the tasks driving it.
pub struct NodeRuntime<S: NullifierStore + 'static> {
    engine: Arc<EngineContainer<S>>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl<S: NullifierStore + 'static> NodeRuntime<S> {
    pub fn new(engine: Arc<EngineContainer<S>>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            engine,
            tasks: Vec::new(),
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn engine(&self) -> Arc<EngineContainer<S>> {
        Arc::clone(&self.engine)
    }

    /// Names of the spawned tasks.
    pub fn task_names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|(name, _)| *name).collect()
    }

    /// Spawn the entropy pump and the block producer as configured.
    pub fn start(&mut self) -> Result<()> {
        let config = &self.engine.config;

        match feed_from_config(&config.pump.feed).context("Failed to open seismic feed")? {
            Some(feed) => {
                let pump = EntropyPump::new(Arc::clone(&self.engine), feed);
                let handle = tokio::spawn(pump.run(self.shutdown_rx.clone()));
                self.tasks.push(("entropy-pump", handle));
            }
            None => info!("No seismic feed configured, entropy arrives with blocks only"),
        }

        if config.producer.enabled {
            let seed = config
                .validator_seed()?
                .context("Block production needs a validator seed")?;
            let producer =
                BlockProducer::new(Arc::clone(&self.engine), Ed25519KeyPair::from_seed(seed));
            let handle = tokio::spawn(producer.run(self.shutdown_rx.clone()));
            self.tasks.push(("block-producer", handle));
        }

        info!(tasks = ?self.task_names(), "Engine tasks started");
        Ok(())
    }

    /// Signal every task and wait for it to stop.
    pub async fn shutdown(self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        for (name, handle) in self.tasks {
            match tokio::time::timeout(SHUTDOWN_GRACE, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(task = name, error = %e, "Task panicked"),
                Err(_) => warn!(task = name, "Task did not stop in time"),
            }
        }
        info!("Shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{EngineConfig, FeedSource, InMemoryEngine};
    use crate::genesis::DEV_VALIDATOR_SEED;
    use qe_06_consensus::ConsensusApi;
    use shared_types::InMemoryEventSink;

    fn engine(config: EngineConfig) -> Arc<InMemoryEngine> {
        Arc::new(InMemoryEngine::in_memory(config, Arc::new(InMemoryEventSink::new())).unwrap())
    }

    #[tokio::test]
    async fn test_idle_runtime_spawns_nothing() {
        let mut runtime = NodeRuntime::new(engine(EngineConfig::default()));
        runtime.start().unwrap();
        assert!(runtime.task_names().is_empty());
        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_producer_and_pump_spawned_and_stopped() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = EngineConfig::default();
        config.pump.feed = FeedSource::File {
            path: dir.path().join("feed.json"),
        };
        config.producer.enabled = true;
        config.producer.produce_empty = true;
        config.producer.validator_seed = Some(hex::encode(DEV_VALIDATOR_SEED));

        let mut runtime = NodeRuntime::new(engine(config));
        runtime.start().unwrap();
        assert_eq!(runtime.task_names(), vec!["entropy-pump", "block-producer"]);

        let engine = runtime.engine();
        for _ in 0..50 {
            if engine.consensus.finalized_height() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(engine.consensus.finalized_height() >= 1);
        runtime.shutdown().await;
    }
}
