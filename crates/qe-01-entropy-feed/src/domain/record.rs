//! Seismic record entities
//!
//! A record is one signed observation from a registered seismic source.
//! Its canonical signing bytes are fixed and versioned: floats are encoded
//! as IEEE-754 bit patterns (little endian) with `-0.0` folded into `0.0`.

use serde::{Deserialize, Serialize};
use shared_crypto::{Ed25519KeyPair, Ed25519Signature, KeccakHasher};
use shared_types::Hash;

/// Identifier of a registered seismic source (station or network code).
pub type SourceId = String;

const SIGNING_DOMAIN: &str = "qe/seismic-record/v1";
const DIGEST_DOMAIN: &str = "qe/seismic-digest/v1";

/// One external entropy observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeismicRecord {
    pub source_id: SourceId,
    /// Unix seconds of the event.
    pub timestamp: u64,
    pub latitude: f64,
    pub longitude: f64,
    pub magnitude: f64,
    pub depth_km: f64,
    pub signature: Ed25519Signature,
}

impl SeismicRecord {
    /// Build a record with an empty signature. Call [`Self::signed_by`] next.
    pub fn unsigned(
        source_id: impl Into<SourceId>,
        timestamp: u64,
        latitude: f64,
        longitude: f64,
        magnitude: f64,
        depth_km: f64,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            timestamp,
            latitude,
            longitude,
            magnitude,
            depth_km,
            signature: Ed25519Signature::from_bytes([0u8; 64]),
        }
    }

    /// Sign the record's canonical bytes with the source key.
    pub fn signed_by(mut self, source_key: &Ed25519KeyPair) -> Self {
        self.signature = source_key.sign(&self.signing_bytes());
        self
    }

    /// Canonical bytes covered by the source signature.
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SIGNING_DOMAIN.len() + self.source_id.len() + 48);
        out.extend_from_slice(SIGNING_DOMAIN.as_bytes());
        out.extend_from_slice(&(self.source_id.len() as u32).to_le_bytes());
        out.extend_from_slice(self.source_id.as_bytes());
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        out.extend_from_slice(&canonical_bits(self.latitude).to_le_bytes());
        out.extend_from_slice(&canonical_bits(self.longitude).to_le_bytes());
        out.extend_from_slice(&canonical_bits(self.magnitude).to_le_bytes());
        out.extend_from_slice(&canonical_bits(self.depth_km).to_le_bytes());
        out
    }

    /// Digest folded into the entropy pool. Covers the signature too, so the
    /// source's unpredictable signature bytes contribute to the mix.
    pub fn digest(&self) -> Hash {
        let mut hasher = KeccakHasher::with_domain(DIGEST_DOMAIN);
        hasher.update(self.signing_bytes());
        hasher.update(self.signature.as_bytes());
        hasher.finalize()
    }

    /// Identity used for duplicate detection.
    pub fn key(&self) -> RecordKey {
        RecordKey {
            source_id: self.source_id.clone(),
            timestamp: self.timestamp,
            latitude_bits: canonical_bits(self.latitude),
            longitude_bits: canonical_bits(self.longitude),
        }
    }
}

/// Same source + timestamp + location identifies a duplicate.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub source_id: SourceId,
    pub timestamp: u64,
    pub latitude_bits: u64,
    pub longitude_bits: u64,
}

/// A record that passed every check of the validator.
///
/// Only the validator constructs this type.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidRecord {
    record: SeismicRecord,
    digest: Hash,
    key: RecordKey,
}

impl ValidRecord {
    pub(crate) fn new(record: SeismicRecord) -> Self {
        let digest = record.digest();
        let key = record.key();
        Self {
            record,
            digest,
            key,
        }
    }

    pub fn record(&self) -> &SeismicRecord {
        &self.record
    }

    pub fn digest(&self) -> &Hash {
        &self.digest
    }

    pub fn key(&self) -> &RecordKey {
        &self.key
    }

    pub fn into_record(self) -> SeismicRecord {
        self.record
    }
}

fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}
