use thiserror::Error;

use crate::pipeline::ProcessingError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("calculator service already running")]
    AlreadyRunning,
    #[error("calculator service not running")]
    NotRunning,
    #[error("calculator service must be idle")]
    NotIdle,
    #[error("fatal transport error: {0}")]
    Fatal(ProcessingError),
    #[error("processing worker panicked: {0}")]
    WorkerPanicked(String),
}
