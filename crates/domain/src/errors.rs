//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for PetClinic services
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ClinicError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A blocking computation was cancelled before it finished.
    ///
    /// Callers must treat this as fatal for the current run and stop
    /// cooperatively instead of retrying.
    #[error("Interrupted: {0}")]
    Interrupted(String),

    #[error("Worker pool exhausted: {0}")]
    PoolExhausted(String),

    #[error("Task failed: {0}")]
    Task(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClinicError {
    /// Whether the error signals cooperative cancellation
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted(_))
    }
}

/// Result type alias for PetClinic operations
pub type Result<T> = std::result::Result<T, ClinicError>;
