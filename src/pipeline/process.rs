use std::time::Duration;

use crate::codec::{self, WireFormat};
use crate::ports::{DataReceiver, DataSender};
use crate::track::{Clock, SystemClock, TrackCalculations};

use super::error::ProcessingError;
use super::metrics::ProcessingMetrics;

pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_millis(500);

/// Receive, decode, compute, encode and send one track per call.
///
/// Owns its ports and metrics. Not meant to be shared between threads: run
/// one instance per worker and aggregate metrics outside.
pub struct ProcessTrackUseCase {
    receiver: Box<dyn DataReceiver>,
    sender: Box<dyn DataSender>,
    calculations: TrackCalculations,
    clock: Box<dyn Clock>,
    inbound: WireFormat,
    outbound: WireFormat,
    receive_timeout: Duration,
    metrics: ProcessingMetrics,
}

impl ProcessTrackUseCase {
    pub fn new(
        receiver: Box<dyn DataReceiver>,
        sender: Box<dyn DataSender>,
        calculations: TrackCalculations,
    ) -> Self {
        let clock = SystemClock::new(calculations.config().ticks_per_second);
        ProcessTrackUseCase {
            receiver,
            sender,
            calculations,
            clock: Box::new(clock),
            inbound: WireFormat::default(),
            outbound: WireFormat::default(),
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
            metrics: ProcessingMetrics::default(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_formats(mut self, inbound: WireFormat, outbound: WireFormat) -> Self {
        self.inbound = inbound;
        self.outbound = outbound;
        self
    }

    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = timeout;
        self
    }

    pub fn metrics(&self) -> ProcessingMetrics {
        self.metrics.clone()
    }

    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Run one receive → compute → send cycle.
    ///
    /// Returns `Ok(())` both when a track was forwarded and when the receive
    /// timed out empty. Every received message ends in exactly one send or
    /// one counted failure.
    pub fn process_one(&mut self) -> Result<(), ProcessingError> {
        let raw = match self.receiver.receive(self.receive_timeout) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(()),
            Err(e) => {
                self.metrics.decode_failures += 1;
                return Err(e.into());
            }
        };
        self.metrics.messages_received += 1;

        let track = match codec::decode_track(self.inbound, &raw) {
            Ok(track) => track,
            Err(e) => {
                self.metrics.decode_failures += 1;
                return Err(ProcessingError::Decode(e));
            }
        };

        let now = self.clock.now();
        let calculated = match self.calculations.compute(track, now) {
            Ok(calculated) => calculated,
            Err(e) => {
                self.metrics.calculation_failures += 1;
                return Err(e.into());
            }
        };
        if TrackCalculations::is_skewed(calculated.timestamp(), now) {
            self.metrics.clock_skew_events += 1;
            log::warn!(
                "Track {} timestamp {} is ahead of processing clock {} by {} ticks",
                calculated.track_id(),
                calculated.timestamp(),
                now,
                calculated.timestamp().saturating_sub(now)
            );
        }
        self.metrics.record_delay(calculated.delay());

        let payload = match codec::encode_calculated(self.outbound, &calculated) {
            Ok(payload) => payload,
            Err(e) => {
                self.metrics.encode_failures += 1;
                return Err(ProcessingError::Encode(e));
            }
        };

        if let Err(e) = self.sender.send(payload) {
            self.metrics.send_failures += 1;
            return Err(e.into());
        }
        self.metrics.messages_processed += 1;

        log::debug!(
            "Track {} delay={} hop_delay={:?} adjusted=({:.3}, {:.3}, {:.3})",
            calculated.track_id(),
            calculated.delay(),
            calculated.hop_delay(),
            calculated.adjusted_position().x,
            calculated.adjusted_position().y,
            calculated.adjusted_position().z,
        );
        Ok(())
    }
}
