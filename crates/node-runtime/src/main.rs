//! # Quantum-Entropy Engine Node
//!
//! Reads `QE_CONFIG` (optional JSON file) plus `QE_*` overrides, starts
//! telemetry, builds the engine and runs it until Ctrl+C.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use node_runtime::{EngineConfig, InMemoryEngine, NodeRuntime};
use qe_03_nullifier_registry::NullifierStore;
use quantum_telemetry::init_telemetry;
use shared_types::EventSink;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var_os("QE_CONFIG").map(PathBuf::from);
    let config =
        EngineConfig::load(config_path.as_deref()).context("Failed to load configuration")?;

    let telemetry =
        init_telemetry(config.telemetry.clone()).context("Failed to initialize telemetry")?;
    let sink: Arc<dyn EventSink> = Arc::new(telemetry.event_sink());

    info!("===========================================");
    info!("  Quantum-Entropy Engine v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    if let Err(e) = config.validate_for_production() {
        warn!("{e}; do not run this configuration outside development");
    }

    launch(config, sink).await
}

#[cfg(feature = "rocksdb")]
async fn launch(config: EngineConfig, sink: Arc<dyn EventSink>) -> Result<()> {
    use node_runtime::EngineContainer;

    match config.storage.data_dir.clone() {
        Some(data_dir) => {
            let engine = EngineContainer::with_rocksdb(config, &data_dir, sink)
                .context("Failed to build engine")?;
            info!(data_dir = %data_dir.display(), "Nullifier registry is durable");
            run(NodeRuntime::new(Arc::new(engine))).await
        }
        None => {
            let engine = InMemoryEngine::in_memory(config, sink).context("Failed to build engine")?;
            run(NodeRuntime::new(Arc::new(engine))).await
        }
    }
}

#[cfg(not(feature = "rocksdb"))]
async fn launch(config: EngineConfig, sink: Arc<dyn EventSink>) -> Result<()> {
    if config.storage.data_dir.is_some() {
        warn!("storage.data_dir ignored: built without the rocksdb feature");
    }
    let engine = InMemoryEngine::in_memory(config, sink).context("Failed to build engine")?;
    run(NodeRuntime::new(Arc::new(engine))).await
}

async fn run<S: NullifierStore + 'static>(mut runtime: NodeRuntime<S>) -> Result<()> {
    runtime.start()?;

    info!("Engine is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
