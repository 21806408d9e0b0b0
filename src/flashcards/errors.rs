//! Scheduler error types

use thiserror::Error;

/// Rejections from the scheduler. Both variants are caller bugs, never
/// transient, so nothing here is retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchedulerError {
    #[error("Invalid quality {0}: expected an integer between 0 and 5")]
    InvalidQuality(i32),

    #[error("Invalid card state: {0}")]
    InvalidState(String),
}

impl SchedulerError {
    /// Every scheduler error is an invalid-input error
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidQuality(_) | Self::InvalidState(_))
    }
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
