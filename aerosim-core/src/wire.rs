//! Versioned flat-JSON wire formats
//!
//! The device scripts went through two payload generations without ever
//! reconciling with the analytics dataset SQL, so the field sets are kept
//! as explicit schema versions instead of one guessed-canonical shape.
//! [`SchemaVersion::V1`] carries the legacy names the dataset still
//! queries; [`SchemaVersion::V2`] is the later variant. Both serialize the
//! same scalar set: one string id, one integer timestamp, five readings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{sample::SensorSample, time::Timestamp};

/// Wire-format generation of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaVersion {
    /// Legacy field names, matched by the provisioned dataset query.
    #[default]
    V1,
    /// Later script variant with normalized field names.
    V2,
}

impl SchemaVersion {
    /// Short name used in logs and configuration.
    pub const fn name(&self) -> &'static str {
        match self {
            SchemaVersion::V1 => "v1",
            SchemaVersion::V2 => "v2",
        }
    }

    /// Topic each script variant published to.
    pub const fn default_topic(&self) -> &'static str {
        match self {
            SchemaVersion::V1 => "air-purifier-mask/test",
            SchemaVersion::V2 => "air-purifier/telemetry",
        }
    }

    /// Parse a version name as used in configuration.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "v1" => Some(SchemaVersion::V1),
            "v2" => Some(SchemaVersion::V2),
            _ => None,
        }
    }
}

/// Encoding or decoding a payload failed.
#[derive(Error, Debug)]
pub enum WireError {
    /// Sample could not be serialized.
    #[error("payload encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
    /// Payload bytes did not match the schema version.
    #[error("payload decoding failed: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
struct WireV1 {
    deviceid: String,
    current_ts: Timestamp,
    temperature: f64,
    aqi: u16,
    humidity: u8,
    fan_level: u8,
    purify_volume: u32,
}

#[derive(Serialize, Deserialize)]
struct WireV2 {
    device_id: String,
    timestamp: Timestamp,
    temperature: f64,
    aqi: u16,
    humidity: u8,
    fan_level: u8,
    purified_volume: u32,
}

impl From<&SensorSample> for WireV1 {
    fn from(sample: &SensorSample) -> Self {
        Self {
            deviceid: sample.device_id.clone(),
            current_ts: sample.timestamp,
            temperature: sample.temperature,
            aqi: sample.aqi,
            humidity: sample.humidity,
            fan_level: sample.fan_level,
            purify_volume: sample.purified_volume,
        }
    }
}

impl From<WireV1> for SensorSample {
    fn from(wire: WireV1) -> Self {
        Self {
            device_id: wire.deviceid,
            timestamp: wire.current_ts,
            temperature: wire.temperature,
            aqi: wire.aqi,
            humidity: wire.humidity,
            fan_level: wire.fan_level,
            purified_volume: wire.purify_volume,
        }
    }
}

impl From<&SensorSample> for WireV2 {
    fn from(sample: &SensorSample) -> Self {
        Self {
            device_id: sample.device_id.clone(),
            timestamp: sample.timestamp,
            temperature: sample.temperature,
            aqi: sample.aqi,
            humidity: sample.humidity,
            fan_level: sample.fan_level,
            purified_volume: sample.purified_volume,
        }
    }
}

impl From<WireV2> for SensorSample {
    fn from(wire: WireV2) -> Self {
        Self {
            device_id: wire.device_id,
            timestamp: wire.timestamp,
            temperature: wire.temperature,
            aqi: wire.aqi,
            humidity: wire.humidity,
            fan_level: wire.fan_level,
            purified_volume: wire.purified_volume,
        }
    }
}

/// Serialize one sample as a flat JSON object.
pub fn encode(sample: &SensorSample, version: SchemaVersion) -> Result<Vec<u8>, WireError> {
    let bytes = match version {
        SchemaVersion::V1 => serde_json::to_vec(&WireV1::from(sample)),
        SchemaVersion::V2 => serde_json::to_vec(&WireV2::from(sample)),
    };
    bytes.map_err(WireError::Encode)
}

/// Parse a payload previously produced by [`encode`] with the same version.
pub fn decode(bytes: &[u8], version: SchemaVersion) -> Result<SensorSample, WireError> {
    let sample = match version {
        SchemaVersion::V1 => serde_json::from_slice::<WireV1>(bytes)
            .map(SensorSample::from),
        SchemaVersion::V2 => serde_json::from_slice::<WireV2>(bytes)
            .map(SensorSample::from),
    };
    sample.map_err(WireError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SensorSample {
        SensorSample {
            device_id: "air-purifier-002".into(),
            timestamp: 1_700_000_123,
            temperature: 27.25,
            aqi: 88,
            humidity: 41,
            fan_level: 4,
            purified_volume: 312,
        }
    }

    #[test]
    fn v1_round_trip_is_lossless() {
        let original = sample();
        let bytes = encode(&original, SchemaVersion::V1).unwrap();
        let decoded = decode(&bytes, SchemaVersion::V1).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn v2_round_trip_is_lossless() {
        let original = sample();
        let bytes = encode(&original, SchemaVersion::V2).unwrap();
        let decoded = decode(&bytes, SchemaVersion::V2).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn v1_uses_legacy_field_names() {
        let bytes = encode(&sample(), SchemaVersion::V1).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["deviceid", "current_ts", "temperature", "aqi", "humidity", "fan_level", "purify_volume"] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj.len(), 7);
    }

    #[test]
    fn versions_do_not_cross_decode() {
        let bytes = encode(&sample(), SchemaVersion::V1).unwrap();
        assert!(decode(&bytes, SchemaVersion::V2).is_err());
    }

    #[test]
    fn version_names_parse_back() {
        assert_eq!(SchemaVersion::parse("v1"), Some(SchemaVersion::V1));
        assert_eq!(SchemaVersion::parse("v2"), Some(SchemaVersion::V2));
        assert_eq!(SchemaVersion::parse("v3"), None);
    }
}
