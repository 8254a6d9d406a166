//! # Genesis
//!
//! The genesis description fixes the starting epoch, the initial balances,
//! the validator set and the registered seismic sources. It is plain hex in
//! configuration and becomes typed subsystem input in [`GenesisBuilder`].

mod builder;

pub(crate) use builder::decode_hex_array;
pub use builder::{Genesis, GenesisBuilder, GenesisError};

use serde::{Deserialize, Serialize};
use shared_crypto::Ed25519KeyPair;
use shared_types::Epoch;

/// Seed of the validator key used by [`GenesisConfig::default`].
pub const DEV_VALIDATOR_SEED: [u8; 32] = [1u8; 32];

/// One initial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAllocation {
    /// Hex-encoded 20-byte address.
    pub address: String,
    pub amount: u128,
}

/// One registered seismic source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisSource {
    pub source_id: String,
    /// Hex-encoded Ed25519 public key.
    pub public_key: String,
}

/// Genesis description as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    pub epoch: Epoch,
    pub allocations: Vec<GenesisAllocation>,
    /// Hex-encoded Ed25519 public keys, in validator index order.
    pub validators: Vec<String>,
    pub sources: Vec<GenesisSource>,
}

impl Default for GenesisConfig {
    /// Single development validator, no balances, no sources.
    fn default() -> Self {
        Self::devnet(&[DEV_VALIDATOR_SEED])
    }
}

impl GenesisConfig {
    /// Genesis whose validators derive from the given seeds.
    pub fn devnet(validator_seeds: &[[u8; 32]]) -> Self {
        Self {
            epoch: 0,
            allocations: Vec::new(),
            validators: validator_seeds
                .iter()
                .map(|seed| hex::encode(Ed25519KeyPair::from_seed(*seed).public_key().as_bytes()))
                .collect(),
            sources: Vec::new(),
        }
    }

    /// True if any validator key is a development key.
    pub fn uses_dev_validator(&self) -> bool {
        let dev = hex::encode(
            Ed25519KeyPair::from_seed(DEV_VALIDATOR_SEED)
                .public_key()
                .as_bytes(),
        );
        self.validators.iter().any(|v| v.eq_ignore_ascii_case(&dev))
    }
}
