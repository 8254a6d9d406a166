//! Consensus configuration

use super::{ConsensusError, ConsensusResult, QuorumRule};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    pub quorum: QuorumRule,
    /// Voting window opened when a block is proposed.
    pub vote_timeout: Duration,
    /// Accepted distance between a block's declared epoch and the live epoch.
    pub epoch_lag_tolerance: u64,
    pub max_transactions: usize,
    pub max_entropy_records: usize,
    /// Finalized heights kept for idempotent resubmission. Older blocks
    /// are dropped from memory and fail the height check instead.
    pub finalized_retention: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            quorum: QuorumRule::SuperMajority,
            vote_timeout: Duration::from_secs(10),
            epoch_lag_tolerance: 2,
            max_transactions: 1_000,
            max_entropy_records: 64,
            finalized_retention: 64,
        }
    }
}

impl ConsensusConfig {
    /// Check the config against the number of active validators.
    pub fn validate(&self, active_validators: usize) -> ConsensusResult<()> {
        if active_validators == 0 {
            return Err(ConsensusError::InvalidConfig(
                "validator set has no active validator".into(),
            ));
        }
        let required = self.quorum.threshold(active_validators);
        if required == 0 || required > active_validators {
            return Err(ConsensusError::InvalidConfig(format!(
                "quorum {required} not reachable with {active_validators} active validators"
            )));
        }
        // Two quorums must overlap in more than a third of the validators
        if required * 3 <= active_validators * 2 {
            return Err(ConsensusError::InvalidConfig(format!(
                "quorum {required} of {active_validators} lets two blocks finalize at one height"
            )));
        }
        if self.vote_timeout.is_zero() {
            return Err(ConsensusError::InvalidConfig(
                "vote timeout must be non-zero".into(),
            ));
        }
        if self.finalized_retention == 0 {
            return Err(ConsensusError::InvalidConfig(
                "finalized retention must keep at least one height".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_quorum_refused() {
        let config = ConsensusConfig {
            quorum: QuorumRule::Fixed(8),
            ..ConsensusConfig::default()
        };
        assert!(config.validate(7).is_err());
        assert!(ConsensusConfig::default().validate(7).is_ok());
        assert!(ConsensusConfig::default().validate(0).is_err());
    }

    #[test]
    fn test_quorum_at_or_below_two_thirds_refused() {
        for n in [1, 3, 4] {
            let config = ConsensusConfig {
                quorum: QuorumRule::Fixed(n),
                ..ConsensusConfig::default()
            };
            assert!(config.validate(7).is_err(), "Fixed({n}) of 7");
        }
        let five_of_seven = ConsensusConfig {
            quorum: QuorumRule::Fixed(5),
            ..ConsensusConfig::default()
        };
        assert!(five_of_seven.validate(7).is_ok());

        let single = ConsensusConfig {
            quorum: QuorumRule::Fixed(1),
            ..ConsensusConfig::default()
        };
        assert!(single.validate(1).is_ok());
        assert!(single.validate(2).is_err());
    }

    #[test]
    fn test_zero_retention_refused() {
        let config = ConsensusConfig {
            finalized_retention: 0,
            ..ConsensusConfig::default()
        };
        assert!(config.validate(4).is_err());
    }

    #[test]
    fn test_zero_fixed_quorum_refused() {
        let config = ConsensusConfig {
            quorum: QuorumRule::Fixed(0),
            ..ConsensusConfig::default()
        };
        assert!(config.validate(3).is_err());
    }
}
