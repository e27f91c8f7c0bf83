use thiserror::Error;

use crate::codec::CodecError;
use crate::ports::{ReceiveError, SendError};
use crate::track::CalculationError;

/// Failure of a single `process_one` cycle. All variants except an
/// unrecoverable transport condition are per-message and non-fatal.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("receive: {0}")]
    Receive(#[from] ReceiveError),
    #[error("decode: {0}")]
    Decode(CodecError),
    #[error("calculation: {0}")]
    Calculation(#[from] CalculationError),
    #[error("encode: {0}")]
    Encode(CodecError),
    #[error("send: {0}")]
    Send(#[from] SendError),
}

impl ProcessingError {
    /// True when the transport reported it cannot continue.
    pub fn is_fatal(&self) -> bool {
        match self {
            ProcessingError::Receive(e) => e.is_unrecoverable(),
            ProcessingError::Send(e) => e.is_unrecoverable(),
            _ => false,
        }
    }
}
