//! Genesis decoding and checks.

use super::GenesisConfig;
use qe_01_entropy_feed::SourceRegistry;
use qe_06_consensus::{ValidatorInfo, ValidatorSet};
use shared_crypto::Ed25519PublicKey;
use shared_types::{Address, Epoch};
use std::collections::HashSet;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenesisError {
    #[error("Invalid hex in {field}: {message}")]
    InvalidHex { field: String, message: String },

    #[error("{field} must be {expected} bytes, got {actual}")]
    InvalidLength {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid public key in {field}")]
    InvalidKey { field: String },

    #[error("Genesis has no validators")]
    NoValidators,

    #[error("Validator listed twice: {0}")]
    DuplicateValidator(String),

    #[error("Address allocated twice: {0}")]
    DuplicateAllocation(String),

    #[error("Source registered twice: {0}")]
    DuplicateSource(String),
}

/// Typed genesis input for the subsystems.
#[derive(Debug)]
pub struct Genesis {
    pub epoch: Epoch,
    pub allocations: Vec<(Address, u128)>,
    pub validators: ValidatorSet,
    pub sources: SourceRegistry,
}

/// Decodes a [`GenesisConfig`].
pub struct GenesisBuilder {
    config: GenesisConfig,
}

impl GenesisBuilder {
    pub fn new(config: GenesisConfig) -> Self {
        Self { config }
    }

    pub fn build(self) -> Result<Genesis, GenesisError> {
        let config = self.config;

        if config.validators.is_empty() {
            return Err(GenesisError::NoValidators);
        }

        let mut seen = HashSet::new();
        let mut validators = Vec::with_capacity(config.validators.len());
        for (i, raw) in config.validators.iter().enumerate() {
            let field = format!("validators[{i}]");
            let key = decode_public_key(&field, raw)?;
            if !seen.insert(*key.as_bytes()) {
                return Err(GenesisError::DuplicateValidator(raw.clone()));
            }
            validators.push(ValidatorInfo::new(key));
        }

        let mut addresses = HashSet::new();
        let mut allocations = Vec::with_capacity(config.allocations.len());
        for (i, alloc) in config.allocations.iter().enumerate() {
            let address: Address = decode_fixed(&format!("allocations[{i}].address"), &alloc.address)?;
            if !addresses.insert(address) {
                return Err(GenesisError::DuplicateAllocation(alloc.address.clone()));
            }
            allocations.push((address, alloc.amount));
        }

        let mut sources = SourceRegistry::new();
        for (i, source) in config.sources.iter().enumerate() {
            let key = decode_public_key(&format!("sources[{i}].public_key"), &source.public_key)?;
            if sources.get(&source.source_id).is_some() {
                return Err(GenesisError::DuplicateSource(source.source_id.clone()));
            }
            sources.register(source.source_id.clone(), key);
        }

        info!(
            epoch = config.epoch,
            validators = validators.len(),
            allocations = allocations.len(),
            sources = sources.len(),
            "Genesis decoded"
        );

        Ok(Genesis {
            epoch: config.epoch,
            allocations,
            validators: ValidatorSet::new(validators),
            sources,
        })
    }
}

fn decode_fixed<const N: usize>(field: &str, raw: &str) -> Result<[u8; N], GenesisError> {
    let bytes = hex::decode(raw.trim_start_matches("0x")).map_err(|e| GenesisError::InvalidHex {
        field: field.to_string(),
        message: e.to_string(),
    })?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| GenesisError::InvalidLength {
        field: field.to_string(),
        expected: N,
        actual,
    })
}

fn decode_public_key(field: &str, raw: &str) -> Result<Ed25519PublicKey, GenesisError> {
    let bytes: [u8; 32] = decode_fixed(field, raw)?;
    Ed25519PublicKey::from_bytes(bytes).map_err(|_| GenesisError::InvalidKey {
        field: field.to_string(),
    })
}

/// Decode a hex string of exactly `N` bytes.
pub(crate) fn decode_hex_array<const N: usize>(
    field: &str,
    raw: &str,
) -> Result<[u8; N], GenesisError> {
    decode_fixed(field, raw)
}
