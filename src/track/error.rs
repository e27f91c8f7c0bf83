use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationError {
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(i64),
    #[error("malformed track: {0}")]
    MalformedTrack(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationConfigError {
    #[error("ticks_per_second must be positive, got {0}")]
    NonPositiveTickRate(i64),
    #[error("max_timestamp must not be negative, got {0}")]
    NegativeMaxTimestamp(i64),
}
