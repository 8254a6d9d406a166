//! Ledger configuration

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Accepted distance between a transfer's epoch and the live epoch.
    pub epoch_lag_tolerance: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            epoch_lag_tolerance: 2,
        }
    }
}
