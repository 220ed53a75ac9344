//! Versioned sync payload.
//!
//! The payload describes the data assets the host should load. Each version
//! is the previous version's field set plus additive fields:
//!
//! ```text
//! v1 = { version: 1, database, tables }
//! v2 = { version: 2, database, tables, maps }
//! ```
//!
//! Decoding reads `version` first. A version above the receiver's highest
//! known version fails closed; a known version must carry exactly its
//! declared fields.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::{PayloadError, WireError};

/// Highest payload version this crate implements.
pub const LATEST_PAYLOAD_VERSION: u8 = 2;

/// Version 1 fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncPayloadV1 {
    /// Database archive path
    pub database: String,
    /// Tables to load from the database
    pub tables: Vec<String>,
}

/// Version 2 fields: v1 plus map archives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncPayloadV2 {
    /// Database archive path
    pub database: String,
    /// Tables to load from the database
    pub tables: Vec<String>,
    /// Map archive paths
    pub maps: Vec<String>,
}

impl From<SyncPayloadV1> for SyncPayloadV2 {
    fn from(v1: SyncPayloadV1) -> Self {
        Self {
            database: v1.database,
            tables: v1.tables,
            maps: Vec::new(),
        }
    }
}

/// A sync payload of any known version, discriminated by `version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPayload {
    /// `version: 1`
    V1(SyncPayloadV1),
    /// `version: 2`
    V2(SyncPayloadV2),
}

#[derive(Serialize)]
struct Versioned<'a, P> {
    version: u8,
    #[serde(flatten)]
    body: &'a P,
}

impl SyncPayload {
    /// The version discriminant.
    pub fn version(&self) -> u8 {
        match self {
            SyncPayload::V1(_) => 1,
            SyncPayload::V2(_) => 2,
        }
    }

    /// Database archive path.
    pub fn database(&self) -> &str {
        match self {
            SyncPayload::V1(p) => &p.database,
            SyncPayload::V2(p) => &p.database,
        }
    }

    /// Tables to load.
    pub fn tables(&self) -> &[String] {
        match self {
            SyncPayload::V1(p) => &p.tables,
            SyncPayload::V2(p) => &p.tables,
        }
    }

    /// Map archives (none before v2).
    pub fn maps(&self) -> &[String] {
        match self {
            SyncPayload::V1(_) => &[],
            SyncPayload::V2(p) => &p.maps,
        }
    }

    /// Upgrade to the latest version. Added fields take their empty value.
    pub fn into_latest(self) -> SyncPayloadV2 {
        match self {
            SyncPayload::V1(p) => p.into(),
            SyncPayload::V2(p) => p,
        }
    }

    /// Decode a JSON value, accepting any version up to the latest.
    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        Self::from_value_limited(value, LATEST_PAYLOAD_VERSION)
    }

    /// Decode a JSON value as a receiver that implements versions
    /// `1..=max_version` only.
    pub fn from_value_limited(value: Value, max_version: u8) -> Result<Self, PayloadError> {
        let max = max_version.min(LATEST_PAYLOAD_VERSION);
        let Value::Object(mut fields) = value else {
            return Err(PayloadError::NotAnObject);
        };

        let version = fields
            .remove("version")
            .and_then(|v| v.as_u64())
            .ok_or(PayloadError::MissingVersion)?;

        if version == 0 || version > u64::from(max) {
            return Err(PayloadError::UnsupportedVersion { found: version, max });
        }

        let body = Value::Object(fields);
        match version {
            1 => serde_json::from_value(body)
                .map(SyncPayload::V1)
                .map_err(|source| PayloadError::Malformed { version: 1, source }),
            _ => serde_json::from_value(body)
                .map(SyncPayload::V2)
                .map_err(|source| PayloadError::Malformed { version: 2, source }),
        }
    }

    /// Deserialize from JSON bytes with a version ceiling.
    pub fn from_bytes_limited(bytes: &[u8], max_version: u8) -> Result<Self, WireError> {
        let value: Value = serde_json::from_slice(bytes).map_err(WireError::Deserialization)?;
        Ok(Self::from_value_limited(value, max_version)?)
    }
}

impl From<SyncPayloadV1> for SyncPayload {
    fn from(p: SyncPayloadV1) -> Self {
        SyncPayload::V1(p)
    }
}

impl From<SyncPayloadV2> for SyncPayload {
    fn from(p: SyncPayloadV2) -> Self {
        SyncPayload::V2(p)
    }
}

impl Serialize for SyncPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let version = self.version();
        match self {
            SyncPayload::V1(body) => Versioned { version, body }.serialize(serializer),
            SyncPayload::V2(body) => Versioned { version, body }.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SyncPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        SyncPayload::from_value(value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v1() -> SyncPayloadV1 {
        SyncPayloadV1 {
            database: "database/database.zip".into(),
            tables: vec!["location".into(), "workorder".into()],
        }
    }

    fn v2() -> SyncPayloadV2 {
        SyncPayloadV2 {
            database: "database/database.zip".into(),
            tables: vec!["location".into(), "workorder".into()],
            maps: vec!["maps/Waterbodies_Line.zip".into()],
        }
    }

    #[test]
    fn v2_wire_shape() {
        let value = serde_json::to_value(SyncPayload::V2(v2())).unwrap();
        assert_eq!(
            value,
            json!({
                "version": 2,
                "database": "database/database.zip",
                "tables": ["location", "workorder"],
                "maps": ["maps/Waterbodies_Line.zip"]
            })
        );
    }

    #[test]
    fn v1_roundtrip() {
        let payload = SyncPayload::V1(v1());
        let bytes = serde_json::to_vec(&payload).unwrap();
        let restored = SyncPayload::from_bytes_limited(&bytes, LATEST_PAYLOAD_VERSION).unwrap();
        assert_eq!(payload, restored);
    }

    #[test]
    fn v2_roundtrip() {
        let payload = SyncPayload::V2(v2());
        let bytes = serde_json::to_vec(&payload).unwrap();
        let restored = SyncPayload::from_bytes_limited(&bytes, LATEST_PAYLOAD_VERSION).unwrap();
        assert_eq!(payload, restored);
    }

    #[test]
    fn v1_receiver_rejects_v2() {
        let bytes = serde_json::to_vec(&SyncPayload::V2(v2())).unwrap();
        let err = SyncPayload::from_bytes_limited(&bytes, 1).unwrap_err();
        assert!(matches!(
            err,
            WireError::Payload(PayloadError::UnsupportedVersion { found: 2, max: 1 })
        ));
    }

    #[test]
    fn v1_receiver_accepts_v1() {
        let bytes = serde_json::to_vec(&SyncPayload::V1(v1())).unwrap();
        let payload = SyncPayload::from_bytes_limited(&bytes, 1).unwrap();
        assert_eq!(payload.version(), 1);
    }

    #[test]
    fn future_version_fails_closed() {
        let value = json!({"version": 3, "database": "d", "tables": [], "maps": [], "tiles": []});
        let err = SyncPayload::from_value(value).unwrap_err();
        assert!(matches!(err, PayloadError::UnsupportedVersion { found: 3, max: 2 }));
    }

    #[test]
    fn version_zero_rejected() {
        let err = SyncPayload::from_value(json!({"version": 0})).unwrap_err();
        assert!(matches!(err, PayloadError::UnsupportedVersion { found: 0, .. }));
    }

    #[test]
    fn missing_version_rejected() {
        let err = SyncPayload::from_value(json!({"database": "d", "tables": []})).unwrap_err();
        assert!(matches!(err, PayloadError::MissingVersion));

        let err = SyncPayload::from_value(json!({"version": "2"})).unwrap_err();
        assert!(matches!(err, PayloadError::MissingVersion));
    }

    #[test]
    fn known_version_requires_all_fields() {
        let err = SyncPayload::from_value(json!({"version": 2, "database": "d", "tables": []}))
            .unwrap_err();
        assert!(matches!(err, PayloadError::Malformed { version: 2, .. }));
    }

    #[test]
    fn v1_with_v2_fields_rejected() {
        let value = json!({"version": 1, "database": "d", "tables": [], "maps": ["m"]});
        let err = SyncPayload::from_value(value).unwrap_err();
        assert!(matches!(err, PayloadError::Malformed { version: 1, .. }));
    }

    #[test]
    fn non_object_rejected() {
        let err = SyncPayload::from_value(json!([2])).unwrap_err();
        assert!(matches!(err, PayloadError::NotAnObject));
    }

    #[test]
    fn serde_deserialize_uses_strict_decoder() {
        let result: Result<SyncPayload, _> = serde_json::from_value(json!({"version": 9}));
        assert!(result.is_err());
    }

    #[test]
    fn upgrade_adds_empty_maps() {
        let latest = SyncPayload::V1(v1()).into_latest();
        assert!(latest.maps.is_empty());
        assert_eq!(latest.tables, vec!["location", "workorder"]);
    }

    #[test]
    fn accessors_cover_both_versions() {
        let p1 = SyncPayload::V1(v1());
        let p2 = SyncPayload::V2(v2());
        assert_eq!(p1.database(), p2.database());
        assert_eq!(p1.tables(), p2.tables());
        assert!(p1.maps().is_empty());
        assert_eq!(p2.maps(), ["maps/Waterbodies_Line.zip".to_string()]);
    }
}
