//! Entropy feed configuration

use serde::{Deserialize, Serialize};

/// Freshness window and physical bounds applied to every record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntropyFeedConfig {
    /// Records older than `now - freshness_window_secs` are stale.
    pub freshness_window_secs: u64,
    /// Allowed clock skew for records ahead of `now`.
    pub max_future_skew_secs: u64,
    pub min_magnitude: f64,
    pub max_magnitude: f64,
    /// Deepest plausible hypocenter.
    pub max_depth_km: f64,
}

impl Default for EntropyFeedConfig {
    fn default() -> Self {
        Self {
            freshness_window_secs: 3_600,
            max_future_skew_secs: 30,
            min_magnitude: -2.0,
            max_magnitude: 10.0,
            max_depth_km: 800.0,
        }
    }
}
