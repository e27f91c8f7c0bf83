mod error;
mod metrics;
mod process;

pub use error::ProcessingError;
pub use metrics::ProcessingMetrics;
pub use process::{ProcessTrackUseCase, DEFAULT_RECEIVE_TIMEOUT};
