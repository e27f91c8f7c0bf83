mod calculations;
mod clock;
mod error;
mod types;

pub use calculations::{
    CalculationConfig, TrackCalculations, DEFAULT_MAX_TIMESTAMP, DEFAULT_TICKS_PER_SECOND,
};
pub use clock::{to_ticks, Clock, ManualClock, SystemClock};
pub use error::{CalculationConfigError, CalculationError};
pub use types::{DelayCalculatedTrackData, TrackData, Vector3};
