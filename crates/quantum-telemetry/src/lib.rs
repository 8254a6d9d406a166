//! # Quantum Telemetry
//!
//! Observability plumbing for the Quantum-Entropy engine.
//!
//! ## Components
//!
//! - **Tracing**: global `tracing-subscriber` registry with an `EnvFilter`
//!   and a pretty or JSON fmt layer
//! - **Events**: [`TracingEventSink`] renders drained [`shared_types::EventLog`]s
//!   as structured log lines
//! - **Metrics**: Prometheus text exposition over the runtime registry and
//!   the collectors each subsystem registers behind its `metrics` feature
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quantum_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()?)?;
//!     // ...
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `QE_LOG_LEVEL` / `RUST_LOG` | `info` | Filter directive |
//! | `QE_LOG_FORMAT` | `pretty` | `pretty` or `json` |
//! | `QE_SERVICE_NAME` | `qe-engine` | Service name on log lines |
//! | `QE_METRICS` | `true` | Register runtime metrics |

pub mod config;
pub mod logging;
pub mod metrics;
pub mod tracing_setup;

pub use config::{LogFormat, TelemetryConfig};
pub use logging::{log_engine_event, TracingEventSink};
pub use metrics::{encode_metrics, register_metrics, MetricsHandle};
pub use shared_types::short_hex;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    config.validate()?;

    let metrics = if config.metrics_enabled {
        Some(register_metrics()?)
    } else {
        None
    };

    tracing_setup::init_tracing(&config)?;

    Ok(TelemetryGuard {
        service_name: config.service_name,
        metrics,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
    metrics: Option<MetricsHandle>,
}

impl TelemetryGuard {
    /// Event sink tagged with the configured service name.
    pub fn event_sink(&self) -> TracingEventSink {
        TracingEventSink::new(self.service_name.clone())
    }

    /// Metrics handle, if metrics were enabled.
    pub fn metrics(&self) -> Option<&MetricsHandle> {
        self.metrics.as_ref()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}

/// Span carrying the engine's `subsystem` field.
///
/// ```rust,ignore
/// let _span = subsystem_span!("entropy_pump", subsystem = "node", epoch = 6).entered();
/// ```
#[macro_export]
macro_rules! subsystem_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

/// Increment a counter, optionally with label values.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_refused_before_init() {
        let config = TelemetryConfig {
            service_name: " ".into(),
            ..TelemetryConfig::default()
        };
        assert!(matches!(
            init_telemetry(config),
            Err(TelemetryError::Config(_))
        ));
    }

    #[test]
    fn test_metric_inc_macro() {
        let before = metrics::FEED_POLLS.with_label_values(&["empty"]).get();
        metric_inc!(metrics::FEED_POLLS, &["empty"]);
        assert_eq!(
            metrics::FEED_POLLS.with_label_values(&["empty"]).get(),
            before + 1
        );
    }
}
