use serde::Serialize;

/// Running counters of one `ProcessTrackUseCase`. Delays are in ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingMetrics {
    pub messages_received: u64,
    pub messages_processed: u64,
    /// Undecodable payloads plus receive-side transport errors.
    pub decode_failures: u64,
    pub calculation_failures: u64,
    pub encode_failures: u64,
    pub send_failures: u64,
    /// Tracks whose timestamp lay ahead of the processing clock.
    pub clock_skew_events: u64,
    pub delays_observed: u64,
    pub last_delay: Option<i64>,
    pub max_delay: Option<i64>,
    pub cumulative_delay: u64,
}

impl ProcessingMetrics {
    pub fn messages_failed(&self) -> u64 {
        self.decode_failures + self.calculation_failures + self.encode_failures + self.send_failures
    }

    pub fn mean_delay(&self) -> Option<f64> {
        if self.delays_observed == 0 {
            return None;
        }
        Some(self.cumulative_delay as f64 / self.delays_observed as f64)
    }

    pub(crate) fn record_delay(&mut self, delay: i64) {
        self.delays_observed += 1;
        self.last_delay = Some(delay);
        self.max_delay = Some(self.max_delay.map_or(delay, |max| max.max(delay)));
        self.cumulative_delay = self.cumulative_delay.saturating_add(delay.max(0) as u64);
    }

    pub fn reset(&mut self) {
        *self = ProcessingMetrics::default();
    }
}

impl std::fmt::Display for ProcessingMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "received={} processed={} failed={} (decode={} calc={} encode={} send={}) skew={}",
            self.messages_received,
            self.messages_processed,
            self.messages_failed(),
            self.decode_failures,
            self.calculation_failures,
            self.encode_failures,
            self.send_failures,
            self.clock_skew_events,
        )?;
        match (self.last_delay, self.mean_delay(), self.max_delay) {
            (Some(last), Some(mean), Some(max)) => {
                write!(f, " delay last={last} mean={mean:.1} max={max}")
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_delay() {
        let mut m = ProcessingMetrics::default();
        assert_eq!(m.mean_delay(), None);
        m.record_delay(10);
        m.record_delay(30);
        m.record_delay(0);
        assert_eq!(m.delays_observed, 3);
        assert_eq!(m.last_delay, Some(0));
        assert_eq!(m.max_delay, Some(30));
        assert_eq!(m.mean_delay(), Some(40.0 / 3.0));
    }

    #[test]
    fn test_failed_sum_and_reset() {
        let mut m = ProcessingMetrics {
            decode_failures: 1,
            calculation_failures: 2,
            encode_failures: 3,
            send_failures: 4,
            ..Default::default()
        };
        assert_eq!(m.messages_failed(), 10);
        m.reset();
        assert_eq!(m, ProcessingMetrics::default());
    }

    #[test]
    fn test_display_summary() {
        let mut m = ProcessingMetrics {
            messages_received: 2,
            messages_processed: 1,
            decode_failures: 1,
            ..Default::default()
        };
        assert_eq!(
            m.to_string(),
            "received=2 processed=1 failed=1 (decode=1 calc=0 encode=0 send=0) skew=0"
        );
        m.record_delay(4);
        assert!(m.to_string().ends_with("delay last=4 mean=4.0 max=4"));
    }
}
