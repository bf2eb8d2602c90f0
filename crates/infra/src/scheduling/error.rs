//! Scheduler error types

use thiserror::Error;
use timesheet_domain::TimesheetError;

use crate::errors::InfraError;

/// Scheduler-specific errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Background jobs did not finish within the shutdown budget
    #[error("Scheduler shutdown timed out after {seconds}s with {pending} task(s) still running")]
    Timeout { seconds: u64, pending: usize },

    /// A job panicked
    #[error("Task join failed: {0}")]
    TaskJoinFailed(String),
}

impl From<SchedulerError> for InfraError {
    fn from(err: SchedulerError) -> Self {
        InfraError(TimesheetError::Internal(err.to_string()))
    }
}

impl From<SchedulerError> for TimesheetError {
    fn from(err: SchedulerError) -> Self {
        InfraError::from(err).into()
    }
}

/// Convenience type alias for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;
