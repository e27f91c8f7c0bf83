use serde::Deserialize;

use super::error::{CalculationConfigError, CalculationError};
use super::types::{DelayCalculatedTrackData, Derived, TrackData};

/// Bound from the upstream message contract (i64::MAX / 1000).
pub const DEFAULT_MAX_TIMESTAMP: i64 = 9_223_372_036_854_775;

pub const DEFAULT_TICKS_PER_SECOND: i64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CalculationConfig {
    /// Tick resolution of every timestamp and delay.
    #[serde(default = "default_ticks_per_second")]
    pub ticks_per_second: i64,
    /// Largest timestamp accepted as sane.
    #[serde(default = "default_max_timestamp")]
    pub max_timestamp: i64,
}

fn default_ticks_per_second() -> i64 {
    DEFAULT_TICKS_PER_SECOND
}

fn default_max_timestamp() -> i64 {
    DEFAULT_MAX_TIMESTAMP
}

impl CalculationConfig {
    pub fn validate(&self) -> Result<(), CalculationConfigError> {
        if self.ticks_per_second <= 0 {
            return Err(CalculationConfigError::NonPositiveTickRate(self.ticks_per_second));
        }
        if self.max_timestamp < 0 {
            return Err(CalculationConfigError::NegativeMaxTimestamp(self.max_timestamp));
        }
        Ok(())
    }
}

impl Default for CalculationConfig {
    fn default() -> Self {
        CalculationConfig {
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            max_timestamp: DEFAULT_MAX_TIMESTAMP,
        }
    }
}

/// Delay calculation and linear extrapolation. Holds only configuration, so
/// it can be shared freely across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackCalculations {
    config: CalculationConfig,
}

impl TrackCalculations {
    pub fn new(config: CalculationConfig) -> Result<Self, CalculationConfigError> {
        config.validate()?;
        Ok(TrackCalculations { config })
    }

    pub fn config(&self) -> &CalculationConfig {
        &self.config
    }

    /// Compute the delay-adjusted version of `track` as seen at `now`.
    ///
    /// A `now` earlier than the track timestamp yields a zero delay rather
    /// than an error; use [`TrackCalculations::is_skewed`] to detect it.
    pub fn compute(
        &self,
        track: TrackData,
        now: i64,
    ) -> Result<DelayCalculatedTrackData, CalculationError> {
        let position = self.validate_track(&track)?;

        let delay = clamped_delta(now, track.timestamp);
        let hop_delay = track.sent_at.map(|sent| clamped_delta(now, sent));

        let adjusted_position = match track.velocity {
            Some(velocity) => position + velocity * self.ticks_to_seconds(delay),
            None => position,
        };
        if !adjusted_position.is_finite() {
            return Err(CalculationError::MalformedTrack("extrapolation overflow"));
        }

        Ok(DelayCalculatedTrackData::derive(
            track,
            Derived {
                position,
                delay,
                hop_delay,
                adjusted_position,
                processed_at: now,
            },
        ))
    }

    /// True when `now` lies before a track's own timestamp.
    pub fn is_skewed(timestamp: i64, now: i64) -> bool {
        now < timestamp
    }

    pub fn ticks_to_seconds(&self, ticks: i64) -> f64 {
        ticks as f64 / self.config.ticks_per_second as f64
    }

    fn validate_track(&self, track: &TrackData) -> Result<super::Vector3, CalculationError> {
        if track.track_id.trim().is_empty() {
            return Err(CalculationError::MalformedTrack("missing track identifier"));
        }
        let position = track
            .position
            .ok_or(CalculationError::MalformedTrack("missing position"))?;
        if !position.is_finite() {
            return Err(CalculationError::MalformedTrack("non-finite position"));
        }
        if let Some(velocity) = track.velocity {
            if !velocity.is_finite() {
                return Err(CalculationError::MalformedTrack("non-finite velocity"));
            }
        }

        self.check_timestamp(track.timestamp)?;
        if let Some(sent_at) = track.sent_at {
            self.check_timestamp(sent_at)?;
        }
        Ok(position)
    }

    fn check_timestamp(&self, ts: i64) -> Result<(), CalculationError> {
        if ts < 0 || ts > self.config.max_timestamp {
            return Err(CalculationError::InvalidTimestamp(ts));
        }
        Ok(())
    }
}

fn clamped_delta(now: i64, then: i64) -> i64 {
    now.saturating_sub(then).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::Vector3;

    fn seconds() -> TrackCalculations {
        TrackCalculations::new(CalculationConfig {
            ticks_per_second: 1,
            ..CalculationConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_delay_and_extrapolation() {
        let track =
            TrackData::new("T1", Vector3::ZERO, 1000).with_velocity(Vector3::new(1.0, 0.0, 0.0));
        let out = seconds().compute(track, 1005).unwrap();
        assert_eq!(out.delay(), 5);
        assert_eq!(out.adjusted_position(), Vector3::new(5.0, 0.0, 0.0));
        assert_eq!(out.position(), Vector3::ZERO);
        assert_eq!(out.processed_at(), 1005);
    }

    #[test]
    fn test_clock_skew_clamps_to_zero() {
        let pos = Vector3::new(10.0, 10.0, 10.0);
        let track = TrackData::new("T2", pos, 2000);
        assert!(TrackCalculations::is_skewed(track.timestamp, 1990));
        let out = seconds().compute(track, 1990).unwrap();
        assert_eq!(out.delay(), 0);
        assert_eq!(out.adjusted_position(), pos);
    }

    #[test]
    fn test_skewed_track_with_velocity_is_not_moved() {
        let pos = Vector3::new(1.0, 2.0, 3.0);
        let track = TrackData::new("T3", pos, 50).with_velocity(Vector3::new(9.0, 9.0, 9.0));
        let out = seconds().compute(track, 10).unwrap();
        assert_eq!(out.adjusted_position(), pos);
    }

    #[test]
    fn test_microsecond_resolution_scales_velocity() {
        let calc = TrackCalculations::default();
        let track = TrackData::new("T4", Vector3::ZERO, 1_000_000)
            .with_velocity(Vector3::new(100.0, -50.0, 2.0));
        // 250ms later
        let out = calc.compute(track, 1_250_000).unwrap();
        assert_eq!(out.delay(), 250_000);
        let adj = out.adjusted_position();
        assert!((adj.x - 25.0).abs() < 1e-9);
        assert!((adj.y + 12.5).abs() < 1e-9);
        assert!((adj.z - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_without_velocity_position_unchanged() {
        let pos = Vector3::new(-4.5, 3.25, 1e6);
        for now in [0, 10, 1_000, 1_000_000] {
            let out = seconds().compute(TrackData::new("T", pos, 5), now).unwrap();
            assert_eq!(out.adjusted_position(), pos);
        }
    }

    #[test]
    fn test_hop_delay() {
        let track = TrackData::new("T5", Vector3::ZERO, 100).with_sent_at(180);
        let out = seconds().compute(track, 200).unwrap();
        assert_eq!(out.delay(), 100);
        assert_eq!(out.hop_delay(), Some(20));

        let track = TrackData::new("T5", Vector3::ZERO, 100).with_sent_at(250);
        assert_eq!(seconds().compute(track, 200).unwrap().hop_delay(), Some(0));

        let track = TrackData::new("T5", Vector3::ZERO, 100);
        assert_eq!(seconds().compute(track, 200).unwrap().hop_delay(), None);
    }

    #[test]
    fn test_missing_identifier() {
        let track = TrackData::new("", Vector3::ZERO, 1);
        assert_eq!(
            seconds().compute(track, 2),
            Err(CalculationError::MalformedTrack("missing track identifier"))
        );
    }

    #[test]
    fn test_missing_position() {
        let mut track = TrackData::new("T6", Vector3::ZERO, 1);
        track.position = None;
        assert!(matches!(
            seconds().compute(track, 2),
            Err(CalculationError::MalformedTrack(_))
        ));
    }

    #[test]
    fn test_non_finite_components() {
        let track = TrackData::new("T7", Vector3::new(f64::NAN, 0.0, 0.0), 1);
        assert!(matches!(
            seconds().compute(track, 2),
            Err(CalculationError::MalformedTrack(_))
        ));
        let track = TrackData::new("T7", Vector3::ZERO, 1)
            .with_velocity(Vector3::new(0.0, f64::INFINITY, 0.0));
        assert!(matches!(
            seconds().compute(track, 2),
            Err(CalculationError::MalformedTrack(_))
        ));
    }

    #[test]
    fn test_invalid_timestamps() {
        let calc = TrackCalculations::new(CalculationConfig {
            ticks_per_second: 1,
            max_timestamp: 10_000,
        })
        .unwrap();
        assert_eq!(
            calc.compute(TrackData::new("T8", Vector3::ZERO, -1), 5),
            Err(CalculationError::InvalidTimestamp(-1))
        );
        assert_eq!(
            calc.compute(TrackData::new("T8", Vector3::ZERO, 10_001), 5),
            Err(CalculationError::InvalidTimestamp(10_001))
        );
        assert_eq!(
            calc.compute(TrackData::new("T8", Vector3::ZERO, 1).with_sent_at(-3), 5),
            Err(CalculationError::InvalidTimestamp(-3))
        );
        assert!(calc.compute(TrackData::new("T8", Vector3::ZERO, 10_000), 5).is_ok());
    }

    #[test]
    fn test_compute_is_idempotent() {
        let track = TrackData::new("T9", Vector3::new(1.5, 2.5, 3.5), 42)
            .with_velocity(Vector3::new(0.1, 0.2, 0.3))
            .with_source("radar-1")
            .with_sequence(7);
        let calc = seconds();
        let a = calc.compute(track.clone(), 99).unwrap();
        let b = calc.compute(track, 99).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.source(), Some("radar-1"));
        assert_eq!(a.sequence(), Some(7));
    }

    #[test]
    fn test_extreme_now_does_not_overflow() {
        let track = TrackData::new("T10", Vector3::ZERO, 0);
        let out = seconds().compute(track, i64::MAX).unwrap();
        assert_eq!(out.delay(), i64::MAX);
    }

    #[test]
    fn test_extrapolation_overflow_rejected() {
        let track = TrackData::new("T11", Vector3::ZERO, 0)
            .with_velocity(Vector3::new(1e300, 0.0, 0.0));
        assert_eq!(
            seconds().compute(track, 1_000_000_000),
            Err(CalculationError::MalformedTrack("extrapolation overflow"))
        );
    }

    #[test]
    fn test_config_bounds() {
        let zero_rate = CalculationConfig {
            ticks_per_second: 0,
            ..CalculationConfig::default()
        };
        assert_eq!(
            TrackCalculations::new(zero_rate).unwrap_err(),
            CalculationConfigError::NonPositiveTickRate(0)
        );

        let negative_max = CalculationConfig {
            max_timestamp: -1,
            ..CalculationConfig::default()
        };
        assert_eq!(
            negative_max.validate(),
            Err(CalculationConfigError::NegativeMaxTimestamp(-1))
        );

        let zero_max = CalculationConfig {
            max_timestamp: 0,
            ..CalculationConfig::default()
        };
        assert!(TrackCalculations::new(zero_max).is_ok());
    }
}
