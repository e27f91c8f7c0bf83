//! Track delay calculation: receive track reports, stamp them with their
//! transport delay and a delay-compensated position, and forward them.

pub mod adapters;
pub mod codec;
pub mod config;
pub mod pipeline;
pub mod ports;
pub mod service;
pub mod track;

pub use codec::WireFormat;
pub use config::Config;
pub use pipeline::{ProcessTrackUseCase, ProcessingMetrics};
pub use service::{CalculatorService, ServiceState};
pub use track::{DelayCalculatedTrackData, TrackCalculations, TrackData};
