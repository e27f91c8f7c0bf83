//! Wire encoding of inbound `TrackData` and outbound `DelayCalculatedTrackData`.

use bincode::Options;
use clap::ValueEnum;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use strum_macros::Display;
use thiserror::Error;

use crate::ports::RawMessage;
use crate::track::{DelayCalculatedTrackData, TrackData};

/// Largest payload accepted by the binary decoder.
pub const MAX_PAYLOAD_BYTES: u64 = 64 * 1024;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("binary codec: {0}")]
    Binary(#[from] bincode::Error),
    #[error("json codec: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WireFormat {
    #[default]
    Binary,
    Json,
}

impl WireFormat {
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<RawMessage, CodecError> {
        match self {
            WireFormat::Binary => Ok(binary_options().serialize(value)?),
            WireFormat::Json => Ok(serde_json::to_vec(value)?),
        }
    }

    pub fn decode<T: DeserializeOwned>(&self, payload: &[u8]) -> Result<T, CodecError> {
        match self {
            WireFormat::Binary => Ok(binary_options().deserialize(payload)?),
            WireFormat::Json => Ok(serde_json::from_slice(payload)?),
        }
    }
}

// Fixed-width little-endian, trailing bytes rejected.
fn binary_options() -> impl Options {
    bincode::options()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(MAX_PAYLOAD_BYTES)
}

pub fn encode_track(format: WireFormat, track: &TrackData) -> Result<RawMessage, CodecError> {
    format.encode(track)
}

pub fn decode_track(format: WireFormat, payload: &[u8]) -> Result<TrackData, CodecError> {
    format.decode(payload)
}

pub fn encode_calculated(
    format: WireFormat,
    data: &DelayCalculatedTrackData,
) -> Result<RawMessage, CodecError> {
    format.encode(data)
}

pub fn decode_calculated(
    format: WireFormat,
    payload: &[u8],
) -> Result<DelayCalculatedTrackData, CodecError> {
    format.decode(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{TrackCalculations, Vector3};

    fn sample_output() -> DelayCalculatedTrackData {
        let track = TrackData::new("4840D6", Vector3::new(0.1, -2.5e6, 6.378e6), 1_000_000)
            .with_velocity(Vector3::new(230.7, -0.3, 1.0 / 3.0))
            .with_sent_at(1_000_400)
            .with_sequence(12);
        TrackCalculations::default()
            .compute(track, 1_003_217)
            .unwrap()
    }

    #[test]
    fn test_calculated_survives_both_formats() {
        let out = sample_output();
        for format in [WireFormat::Binary, WireFormat::Json] {
            let bytes = encode_calculated(format, &out).unwrap();
            let back = decode_calculated(format, &bytes).unwrap();
            assert_eq!(back, out, "{format}");
            assert_eq!(
                back.adjusted_position().z.to_bits(),
                out.adjusted_position().z.to_bits()
            );
        }
    }

    #[test]
    fn test_absent_velocity_distinct_from_zero() {
        let without = TrackData::new("A", Vector3::ZERO, 5);
        let with_zero = without.clone().with_velocity(Vector3::ZERO);
        for format in [WireFormat::Binary, WireFormat::Json] {
            let a = decode_track(format, &encode_track(format, &without).unwrap()).unwrap();
            let b = decode_track(format, &encode_track(format, &with_zero).unwrap()).unwrap();
            assert_eq!(a.velocity, None);
            assert_eq!(b.velocity, Some(Vector3::ZERO));
        }
    }

    #[test]
    fn test_json_missing_identifier_decodes() {
        let json = br#"{"position":{"x":1.0,"y":2.0,"z":3.0},"timestamp":10}"#;
        let track = decode_track(WireFormat::Json, json).unwrap();
        assert_eq!(track.track_id, "");
        assert_eq!(track.position, Some(Vector3::new(1.0, 2.0, 3.0)));
        assert_eq!(track.velocity, None);
    }

    #[test]
    fn test_json_missing_timestamp_fails() {
        let json = br#"{"track_id":"T1","position":{"x":1.0,"y":2.0,"z":3.0}}"#;
        assert!(matches!(
            decode_track(WireFormat::Json, json),
            Err(CodecError::Json(_))
        ));
    }

    #[test]
    fn test_garbled_payloads_rejected() {
        assert!(decode_track(WireFormat::Binary, b"garbage").is_err());
        assert!(decode_track(WireFormat::Json, b"garbage").is_err());
        assert!(decode_track(WireFormat::Binary, &[]).is_err());
    }

    #[test]
    fn test_binary_rejects_trailing_bytes() {
        let track = TrackData::new("T1", Vector3::ZERO, 1);
        let mut bytes = encode_track(WireFormat::Binary, &track).unwrap();
        bytes.push(0);
        assert!(decode_track(WireFormat::Binary, &bytes).is_err());
    }

    #[test]
    fn test_binary_rejects_oversized_length_prefix() {
        // string length prefix far beyond the payload limit
        let mut bytes = u64::MAX.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 16]);
        assert!(decode_track(WireFormat::Binary, &bytes).is_err());
    }

    #[test]
    fn test_format_display_and_serde() {
        assert_eq!(WireFormat::Binary.to_string(), "binary");
        assert_eq!(WireFormat::Json.to_string(), "json");
        let parsed: WireFormat = serde_yaml::from_str("json").unwrap();
        assert_eq!(parsed, WireFormat::Json);
    }
}
