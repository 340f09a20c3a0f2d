//! # Nebula Error
//!
//! Shared error-kind infrastructure used by every crate's own `thiserror`
//! error enum. This crate does not replace per-crate error types — each
//! crate (`nebula-action`, `nebula-execution`, `nebula-workflow`, ...) still
//! defines its own `#[derive(thiserror::Error)]` enum — it provides the
//! common vocabulary those enums are categorized against: a stable
//! [`ErrorKind`] classification and the [`Classify`] trait used to query it,
//! so the engine and resilience layers can reason about retryability
//! without downcasting to every concrete error type.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable classification of an error's retry/severity semantics.
///
/// Every crate-local error type implements [`Classify`] to map its own
/// variants onto this shared vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ErrorKind {
    /// Transient failure; retrying with backoff may succeed.
    Transient,
    /// Permanent failure; retrying will not help.
    Permanent,
    /// The caller supplied invalid input.
    InvalidInput,
    /// A requested entity does not exist.
    NotFound,
    /// An optimistic concurrency check failed (version conflict).
    Conflict,
    /// The caller is not authorized to perform the operation.
    Unauthorized,
    /// An operation did not complete within its allotted time.
    Timeout,
    /// The operation was cancelled cooperatively.
    Cancelled,
    /// An invariant was violated that indicates a bug, not bad input.
    Internal,
}

impl ErrorKind {
    /// Returns `true` if an operation that failed with this kind is
    /// generally safe to retry (with backoff).
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Transient | Self::Timeout)
    }

    /// Returns `true` if this kind reflects a problem with the request
    /// itself rather than the system processing it.
    #[must_use]
    pub fn is_caller_fault(self) -> bool {
        matches!(
            self,
            Self::InvalidInput | Self::NotFound | Self::Conflict | Self::Unauthorized
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Transient => "transient",
            Self::Permanent => "permanent",
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Unauthorized => "unauthorized",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Implemented by every crate-local error enum to expose its [`ErrorKind`]
/// without requiring callers to match on concrete variants.
pub trait Classify {
    /// Classify this error into the shared [`ErrorKind`] vocabulary.
    fn kind(&self) -> ErrorKind;

    /// Convenience wrapper over [`ErrorKind::is_retryable`].
    fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}
