use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

/// Cartesian triple. Positions are metres, velocities metres per second.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3 { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, other: Vector3) -> Vector3 {
        Vector3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;

    fn mul(self, factor: f64) -> Vector3 {
        Vector3::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

/// One track update as received from upstream.
///
/// `track_id` and `position` default to empty/absent when missing from a
/// payload so that validation, not decoding, rejects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackData {
    #[serde(default)]
    pub track_id: String,
    #[serde(default)]
    pub position: Option<Vector3>,
    #[serde(default)]
    pub velocity: Option<Vector3>,
    /// Origin instant, in ticks since the Unix epoch.
    pub timestamp: i64,
    /// Instant the previous hop sent this message, in ticks.
    #[serde(default)]
    pub sent_at: Option<i64>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub sequence: Option<u64>,
}

impl TrackData {
    pub fn new(track_id: impl Into<String>, position: Vector3, timestamp: i64) -> Self {
        TrackData {
            track_id: track_id.into(),
            position: Some(position),
            velocity: None,
            timestamp,
            sent_at: None,
            source: None,
            sequence: None,
        }
    }

    pub fn with_velocity(mut self, velocity: Vector3) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_sent_at(mut self, sent_at: i64) -> Self {
        self.sent_at = Some(sent_at);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = Some(sequence);
        self
    }
}

/// A track after delay adjustment. Only `TrackCalculations` builds these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayCalculatedTrackData {
    track_id: String,
    position: Vector3,
    velocity: Option<Vector3>,
    timestamp: i64,
    sent_at: Option<i64>,
    source: Option<String>,
    sequence: Option<u64>,
    delay: i64,
    hop_delay: Option<i64>,
    adjusted_position: Vector3,
    processed_at: i64,
}

/// Fields computed by `TrackCalculations` on top of the input track.
pub(crate) struct Derived {
    pub position: Vector3,
    pub delay: i64,
    pub hop_delay: Option<i64>,
    pub adjusted_position: Vector3,
    pub processed_at: i64,
}

impl DelayCalculatedTrackData {
    pub(crate) fn derive(track: TrackData, derived: Derived) -> Self {
        DelayCalculatedTrackData {
            track_id: track.track_id,
            position: derived.position,
            velocity: track.velocity,
            timestamp: track.timestamp,
            sent_at: track.sent_at,
            source: track.source,
            sequence: track.sequence,
            delay: derived.delay,
            hop_delay: derived.hop_delay,
            adjusted_position: derived.adjusted_position,
            processed_at: derived.processed_at,
        }
    }

    pub fn track_id(&self) -> &str {
        &self.track_id
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn velocity(&self) -> Option<Vector3> {
        self.velocity
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn sent_at(&self) -> Option<i64> {
        self.sent_at
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn sequence(&self) -> Option<u64> {
        self.sequence
    }

    /// `processed_at - timestamp`, clamped to zero.
    pub fn delay(&self) -> i64 {
        self.delay
    }

    /// `processed_at - sent_at`, clamped to zero, when the previous hop stamped it.
    pub fn hop_delay(&self) -> Option<i64> {
        self.hop_delay
    }

    pub fn adjusted_position(&self) -> Vector3 {
        self.adjusted_position
    }

    pub fn processed_at(&self) -> i64 {
        self.processed_at
    }
}
