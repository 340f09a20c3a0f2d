//! Crate-wide error type for `nebula-core`.

use thiserror::Error;

/// Errors produced by core identity, scope, and type operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A UUID-based identifier failed to parse.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] domain_key::UuidParseError),

    /// A domain key (node key, plugin key, ...) failed to parse.
    #[error("invalid key: {0}")]
    InvalidKey(#[from] domain_key::KeyParseError),

    /// A scope was requested that does not contain another scope it was
    /// expected to contain (e.g. an RBAC check across tenants).
    #[error("scope '{requested}' is not contained within '{boundary}'")]
    ScopeViolation {
        /// The scope that was requested.
        requested: String,
        /// The scope boundary it was checked against.
        boundary: String,
    },

    /// A version string or pair did not parse or satisfy a constraint.
    #[error("invalid version: {0}")]
    InvalidVersion(String),
}
