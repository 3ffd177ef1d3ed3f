use thiserror::Error;

/// Errors raised by [`crate::compute_schedule`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The request was rejected before any assignment ran.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The assigners failed to produce a complete schedule from a request that passed validation.
    #[error("Algorithm invariant violated: {0}")]
    AlgorithmInvariantViolation(String),
}

impl ScheduleError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ScheduleError::InvalidInput(message.into())
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        ScheduleError::AlgorithmInvariantViolation(message.into())
    }

    /// True when the caller can fix the request and try again.
    pub fn is_input_error(&self) -> bool {
        matches!(self, ScheduleError::InvalidInput(_))
    }
}
