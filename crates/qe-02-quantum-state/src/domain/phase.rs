//! Rotation state machine
//!
//! ```text
//! Stable ──begin──→ RotationPending ──commit──→ Rotated
//!                        │
//!                        └──refused──→ Rejected
//! ```
//!
//! `Rotated` and `Rejected` are observable until the next rotation starts.
//! An abandoned rotation returns to `Stable`.

use serde::{Deserialize, Serialize};
use shared_types::Epoch;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationPhase {
    Stable,
    RotationPending { from_epoch: Epoch },
    Rotated { epoch: Epoch },
    Rejected { attempted_epoch: Epoch },
}

impl RotationPhase {
    pub fn is_pending(&self) -> bool {
        matches!(self, RotationPhase::RotationPending { .. })
    }
}

impl Default for RotationPhase {
    fn default() -> Self {
        RotationPhase::Stable
    }
}
