//! Sync payload building and version-limited decoding.

use serde::{Deserialize, Serialize};
use webbridge_types::{
    PayloadError, SyncPayload, SyncPayloadV2, WireError, LATEST_PAYLOAD_VERSION,
};

/// Statically configured data assets the host should load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadConfig {
    /// Database archive path.
    #[serde(default = "default_database")]
    pub database: String,
    /// Tables to load from the database.
    #[serde(default = "default_tables")]
    pub tables: Vec<String>,
    /// Map archive paths.
    #[serde(default = "default_maps")]
    pub maps: Vec<String>,
}

fn default_database() -> String {
    "database/database.zip".to_string()
}

fn default_tables() -> Vec<String> {
    vec!["location".to_string(), "workorder".to_string()]
}

fn default_maps() -> Vec<String> {
    vec!["maps/Waterbodies_Line.zip".to_string()]
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            tables: default_tables(),
            maps: default_maps(),
        }
    }
}

/// The current payload for `config`.
///
/// Pure and deterministic: the same config always yields the same payload.
pub fn build_current_payload(config: &PayloadConfig) -> SyncPayloadV2 {
    SyncPayloadV2 {
        database: config.database.clone(),
        tables: config.tables.clone(),
        maps: config.maps.clone(),
    }
}

/// Decodes sync payloads as a receiver implementing versions
/// `1..=max_version`.
///
/// Anything newer fails closed with [`PayloadError::UnsupportedVersion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadDecoder {
    max_version: u8,
}

impl Default for PayloadDecoder {
    fn default() -> Self {
        Self::new(LATEST_PAYLOAD_VERSION)
    }
}

impl PayloadDecoder {
    /// A decoder knowing versions up to `max_version` (capped at the latest).
    pub fn new(max_version: u8) -> Self {
        Self {
            max_version: max_version.min(LATEST_PAYLOAD_VERSION),
        }
    }

    /// Highest version this decoder accepts.
    pub fn max_version(&self) -> u8 {
        self.max_version
    }

    /// Decode JSON bytes.
    pub fn decode(&self, bytes: &[u8]) -> Result<SyncPayload, WireError> {
        SyncPayload::from_bytes_limited(bytes, self.max_version)
    }

    /// Decode an already-parsed JSON value.
    pub fn decode_value(&self, value: serde_json::Value) -> Result<SyncPayload, PayloadError> {
        SyncPayload::from_value_limited(value, self.max_version)
    }
}
