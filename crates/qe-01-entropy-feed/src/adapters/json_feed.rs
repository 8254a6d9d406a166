//! JSON wire format of the seismic feed
//!
//! ```json
//! [{"timestamp":1000,"latitude":34.9,"longitude":-106.4,"magnitude":6.2,
//!   "depth":10.0,"source_id":"IU.ANMO","signature":"<128 hex chars>"}]
//! ```

use crate::domain::{FeedError, SeismicRecord};
use serde::{Deserialize, Serialize};
use shared_crypto::Ed25519Signature;

/// One record as transmitted by the feed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedRecordDto {
    pub timestamp: u64,
    pub latitude: f64,
    pub longitude: f64,
    pub magnitude: f64,
    pub depth: f64,
    pub source_id: String,
    /// Hex-encoded 64-byte Ed25519 signature.
    pub signature: String,
}

impl TryFrom<FeedRecordDto> for SeismicRecord {
    type Error = FeedError;

    fn try_from(dto: FeedRecordDto) -> Result<Self, Self::Error> {
        let raw = hex::decode(dto.signature.trim_start_matches("0x"))
            .map_err(|e| FeedError::Malformed(format!("signature hex: {e}")))?;
        let signature = Ed25519Signature::from_slice(&raw)
            .map_err(|e| FeedError::Malformed(e.to_string()))?;

        Ok(SeismicRecord {
            source_id: dto.source_id,
            timestamp: dto.timestamp,
            latitude: dto.latitude,
            longitude: dto.longitude,
            magnitude: dto.magnitude,
            depth_km: dto.depth,
            signature,
        })
    }
}

impl From<&SeismicRecord> for FeedRecordDto {
    fn from(record: &SeismicRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            latitude: record.latitude,
            longitude: record.longitude,
            magnitude: record.magnitude,
            depth: record.depth_km,
            source_id: record.source_id.clone(),
            signature: hex::encode(record.signature.as_bytes()),
        }
    }
}

/// Decode a JSON array of feed records.
pub fn decode_feed_batch(payload: &[u8]) -> Result<Vec<SeismicRecord>, FeedError> {
    let dtos: Vec<FeedRecordDto> =
        serde_json::from_slice(payload).map_err(|e| FeedError::Malformed(e.to_string()))?;
    dtos.into_iter().map(SeismicRecord::try_from).collect()
}

/// Encode records into the feed's JSON format.
pub fn encode_feed_batch(records: &[SeismicRecord]) -> Result<Vec<u8>, FeedError> {
    let dtos: Vec<FeedRecordDto> = records.iter().map(FeedRecordDto::from).collect();
    serde_json::to_vec(&dtos).map_err(|e| FeedError::Malformed(e.to_string()))
}
