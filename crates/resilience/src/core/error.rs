//! Error type shared across resilience patterns.

use std::time::Duration;

use nebula_error::{Classify, ErrorKind};
use thiserror::Error;

/// Shared retry/severity classification, re-exported from `nebula-error` so
/// callers don't need a second vocabulary for "is this worth retrying".
pub type ErrorClass = ErrorKind;

/// Error produced by a resilience pattern (circuit breaker, retry, timeout, ...).
#[derive(Debug, Error)]
pub enum ResilienceError {
    /// The wrapped operation did not complete within its allotted time.
    #[error("operation timed out after {duration:?}")]
    Timeout {
        /// Configured timeout duration.
        duration: Duration,
        /// Optional context describing what was running.
        context: Option<String>,
    },

    /// The circuit breaker is open and rejected the call without running it.
    #[error("circuit breaker is {state}")]
    CircuitBreakerOpen {
        /// Human-readable state label (`"open"`, `"half-open (limit reached)"`, ...).
        state: String,
        /// How long until the circuit breaker will allow another attempt.
        retry_after: Option<Duration>,
    },

    /// Retry attempts were exhausted without a successful result.
    #[error("retry attempts exhausted after {attempts} tries")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: usize,
        /// The last error observed before giving up.
        #[source]
        last_error: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The operation was cancelled cooperatively before it completed.
    #[error("operation was cancelled")]
    Cancelled,

    /// Catch-all for operation-specific failures that don't fit a named variant.
    #[error("{message}")]
    Custom {
        /// Human-readable description.
        message: String,
        /// Whether retrying this error is expected to help.
        retryable: bool,
        /// Underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Classify for ResilienceError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::CircuitBreakerOpen { .. } => ErrorKind::Transient,
            Self::RetriesExhausted { .. } => ErrorKind::Permanent,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Custom { retryable, .. } => {
                if *retryable { ErrorKind::Transient } else { ErrorKind::Permanent }
            }
        }
    }
}
