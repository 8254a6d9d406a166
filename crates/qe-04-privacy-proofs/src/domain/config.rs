//! Privacy proof configuration

use serde::{Deserialize, Serialize};

/// Epoch freshness policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyConfig {
    /// A proof bound to epoch `E` is accepted while `live <= E + lag`.
    pub epoch_lag_tolerance: u64,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            epoch_lag_tolerance: 2,
        }
    }
}
