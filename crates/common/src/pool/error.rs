//! Worker pool error types

use petclinic_domain::ClinicError;
use thiserror::Error;

/// Errors raised by the worker pool
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Admission limit reached; the task was not accepted
    #[error("Worker pool exhausted: {capacity} tasks already admitted")]
    Exhausted { capacity: usize },

    /// The pool no longer accepts or runs tasks
    #[error("Worker pool is shut down")]
    ShutDown,

    /// The task panicked or was aborted before producing a result
    #[error("Pool task failed: {0}")]
    TaskFailed(String),

    #[error("Invalid worker pool configuration: {0}")]
    InvalidConfig(String),
}

impl From<PoolError> for ClinicError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::Exhausted { .. } => Self::PoolExhausted(err.to_string()),
            PoolError::ShutDown => Self::Interrupted(err.to_string()),
            PoolError::TaskFailed(_) => Self::Task(err.to_string()),
            PoolError::InvalidConfig(_) => Self::Config(err.to_string()),
        }
    }
}

/// Convenience type alias for pool operations
pub type PoolResult<T> = Result<T, PoolError>;
