//! Error types for the logging subsystem.

use thiserror::Error;

/// Errors that can occur while building or reloading the logger.
#[derive(Debug, Error)]
pub enum LogError {
    /// An `EnvFilter` directive string failed to parse.
    #[error("invalid filter directive: {0}")]
    Filter(String),

    /// The configured writer (e.g. a file sink) could not be initialized.
    #[error("writer initialization failed: {0}")]
    Writer(String),

    /// Any other configuration error (filter reload, subscriber already set, ...).
    #[error("logger configuration error: {0}")]
    Config(String),
}

/// Convenience alias for results returned by the logger builder.
pub type LogResult<T> = Result<T, LogError>;
