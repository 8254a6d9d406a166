//! Prometheus metrics for the engine runtime.
//!
//! Subsystem crates register their own collectors with the Prometheus
//! default registry behind their `metrics` feature. The collectors below
//! live in [`REGISTRY`] and cover what only the runtime sees: drained
//! events, the entropy pump and cross-subsystem errors.
//!
//! All metrics follow the naming convention: `qe_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use shared_types::EngineEvent;
use std::time::Instant;

use crate::TelemetryError;

lazy_static! {
    /// Runtime metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Events drained from call logs, by label
    pub static ref EVENTS_EMITTED: IntCounterVec = IntCounterVec::new(
        Opts::new("qe_engine_events_total", "Engine events drained from call logs"),
        &["event"]
    ).expect("metric creation failed");

    /// Live quantum epoch as last observed by the runtime
    pub static ref CURRENT_EPOCH: IntGauge = IntGauge::new(
        "qe_engine_epoch",
        "Live quantum epoch"
    ).expect("metric creation failed");

    /// Height of the last finalized block
    pub static ref FINALIZED_HEIGHT: IntGauge = IntGauge::new(
        "qe_engine_finalized_height",
        "Height of the last finalized block"
    ).expect("metric creation failed");

    /// Feed polls by outcome: records/empty/error
    pub static ref FEED_POLLS: IntCounterVec = IntCounterVec::new(
        Opts::new("qe_feed_polls_total", "Seismic feed polls"),
        &["outcome"]
    ).expect("metric creation failed");

    /// Fetched records by validation result: accepted/rejected
    pub static ref FEED_RECORDS: IntCounterVec = IntCounterVec::new(
        Opts::new("qe_feed_records_total", "Seismic records fetched"),
        &["result"]
    ).expect("metric creation failed");

    /// Current pump backoff delay
    pub static ref FEED_BACKOFF_MS: IntGauge = IntGauge::new(
        "qe_feed_backoff_milliseconds",
        "Current delay before the next feed poll"
    ).expect("metric creation failed");

    /// Feed fetch latency
    pub static ref FEED_POLL_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "qe_feed_poll_duration_seconds",
            "Time spent fetching one feed batch"
        ).buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0])
    ).expect("metric creation failed");

    /// Errors by subsystem and reason label
    pub static ref ENGINE_ERRORS: IntCounterVec = IntCounterVec::new(
        Opts::new("qe_engine_errors_total", "Errors by subsystem and reason"),
        &["subsystem", "reason"]
    ).expect("metric creation failed");

    /// Block build-to-finalize latency as seen by the runtime
    pub static ref ROUND_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "qe_engine_round_duration_seconds",
            "Time from proposal to finalization or timeout"
        ).buckets(exponential_buckets(0.01, 2.0, 12).unwrap_or_default())
    ).expect("metric creation failed");
}

/// Handle over both the runtime registry and the default registry.
#[derive(Clone, Debug, Default)]
pub struct MetricsHandle {
    _private: (),
}

impl MetricsHandle {
    /// Render every registered metric in Prometheus text format.
    pub fn encode(&self) -> Result<String, TelemetryError> {
        encode_metrics()
    }
}

/// Register the runtime metrics. Safe to call more than once.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(EVENTS_EMITTED.clone()),
        Box::new(CURRENT_EPOCH.clone()),
        Box::new(FINALIZED_HEIGHT.clone()),
        Box::new(FEED_POLLS.clone()),
        Box::new(FEED_RECORDS.clone()),
        Box::new(FEED_BACKOFF_MS.clone()),
        Box::new(FEED_POLL_DURATION.clone()),
        Box::new(ENGINE_ERRORS.clone()),
        Box::new(ROUND_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle::default())
}

/// Encode runtime and subsystem metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let mut metric_families = REGISTRY.gather();
    metric_families.extend(prometheus::gather());

    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Count one drained event and track the gauges it moves.
pub fn record_event(event: &EngineEvent) {
    EVENTS_EMITTED.with_label_values(&[event.label()]).inc();
    match event {
        EngineEvent::RotationAccepted { epoch, .. } => {
            CURRENT_EPOCH.set(i64::try_from(*epoch).unwrap_or(i64::MAX))
        }
        EngineEvent::BlockFinalized { height, .. } => {
            FINALIZED_HEIGHT.set(i64::try_from(*height).unwrap_or(i64::MAX))
        }
        _ => {}
    }
}

/// Times drained so far for `label`.
pub fn event_count(label: &str) -> u64 {
    EVENTS_EMITTED.with_label_values(&[label]).get()
}

pub fn record_error(subsystem: &str, reason: &str) {
    ENGINE_ERRORS.with_label_values(&[subsystem, reason]).inc();
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
