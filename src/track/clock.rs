use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Source of the "now" instant used for delay calculation, in ticks.
pub trait Clock: Send {
    fn now(&self) -> i64;
}

/// Wall clock at a fixed tick resolution.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    ticks_per_second: i64,
}

impl SystemClock {
    pub fn new(ticks_per_second: i64) -> Self {
        SystemClock { ticks_per_second }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock::new(1_000_000)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        to_ticks(Utc::now(), self.ticks_per_second)
    }
}

/// Convert a wall-clock instant to ticks since the Unix epoch.
pub fn to_ticks(at: DateTime<Utc>, ticks_per_second: i64) -> i64 {
    let tps = ticks_per_second as i128;
    let ticks =
        at.timestamp() as i128 * tps + at.timestamp_subsec_nanos() as i128 * tps / 1_000_000_000;
    ticks.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Manually driven clock. Clones share the same instant.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(now: i64) -> Self {
        ManualClock {
            now: Arc::new(AtomicI64::new(now)),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, ticks: i64) {
        self.now.fetch_add(ticks, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_to_ticks_resolutions() {
        let at = Utc.timestamp_opt(1_700_000_000, 250_000_000).unwrap();
        assert_eq!(to_ticks(at, 1), 1_700_000_000);
        assert_eq!(to_ticks(at, 1_000), 1_700_000_000_250);
        assert_eq!(to_ticks(at, 1_000_000), 1_700_000_000_250_000);
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(100);
        let other = clock.clone();
        clock.advance(5);
        assert_eq!(other.now(), 105);
        other.set(7);
        assert_eq!(clock.now(), 7);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        let now = SystemClock::default().now();
        assert!(now > 1_577_836_800_000_000);
    }
}
