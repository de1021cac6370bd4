//! Validation errors for model construction.

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised when constructing a model type from invalid values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Negative timestamp: {0}")]
    NegativeTimestamp(f64),

    #[error("Token end {end} precedes start {start}")]
    EndBeforeStart { start: f64, end: f64 },

    #[error("Confidence {0} outside [0, 1]")]
    ConfidenceOutOfRange(f64),

    #[error("Part window end {end} must exceed start {start}")]
    EmptyWindow { start: f64, end: f64 },

    #[error("Trim end {trim_end} exceeds native duration {native_duration}")]
    TrimBeyondSource { trim_end: f64, native_duration: f64 },

    #[error("Clip native duration must be positive, got {0}")]
    NonPositiveDuration(f64),

    #[error("Transcript token at index {index} starts at {start} before previous start {previous}")]
    UnorderedTokens {
        index: usize,
        start: f64,
        previous: f64,
    },
}
