//! Signal engine error types

use thiserror::Error;

/// Contract violations detected by the signal engine.
///
/// These are raised instead of silently evaluating an index whose
/// thresholds or pattern are undefined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("insufficient bars: need at least {needed}, got {got}")]
    InsufficientBars { needed: usize, got: usize },

    #[error("index {index} out of range for window of {len} bars")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("index {index} is below the first evaluable index {min}")]
    IndexBelowWarmup { index: usize, min: usize },

    #[error("input series lengths differ")]
    LengthMismatch,
}

pub type EngineResult<T> = Result<T, EngineError>;
