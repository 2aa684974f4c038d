//! # Error Types
//!
//! Caller-facing errors raised by the executor surface. Failures reported by an
//! [`Operation`](crate::operation::Operation) are a separate type,
//! [`OperationError`](crate::operation::OperationError), because they never
//! escape the execution loop.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacerError {
    #[error("Executor is already running")]
    AlreadyRunning,

    #[error("Executor is not running")]
    NotRunning,

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Runtime unavailable: {0}")]
    RuntimeUnavailable(String),
}

impl PacerError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError(message.into())
    }
}

impl From<config::ConfigError> for PacerError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigurationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PacerError>;
