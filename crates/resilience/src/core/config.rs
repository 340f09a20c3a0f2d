//! Configuration trait and error type shared by resilience pattern configs.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Result alias for configuration construction and validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Error raised while validating or looking up pattern configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration value failed validation.
    #[error("invalid configuration: {reason}")]
    Validation {
        /// Description of what failed validation.
        reason: String,
    },
    /// A requested configuration path does not exist.
    #[error("{resource} not found: {key}")]
    NotFound {
        /// The kind of thing that was being looked up (e.g. `"config"`).
        resource: String,
        /// The path or key that was missing.
        key: String,
    },
    /// Serializing or deserializing a configuration value failed.
    #[error("configuration (de)serialization failed: {0}")]
    Serde(String),
}

impl ConfigError {
    /// Builds a [`ConfigError::Validation`] from any displayable reason.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation { reason: reason.into() }
    }

    /// Builds a [`ConfigError::NotFound`] for `key` under `resource`.
    pub fn not_found(resource: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into(), key: key.into() }
    }
}

/// Implemented by every resilience pattern's configuration struct.
///
/// Supertrait bounds on `Serialize`/`DeserializeOwned` let a config round-trip
/// through [`crate::core::dynamic::DynamicConfig`]'s `serde_json::Value` storage.
pub trait ResilienceConfig: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Checks runtime-only invariants that can't be enforced at compile time.
    fn validate(&self) -> ConfigResult<()>;

    /// Returns this pattern's default configuration.
    fn default_config() -> Self;

    /// Merges `other` into `self`, taking the more conservative value field by field.
    fn merge(&mut self, other: Self);

    /// Serializes to a JSON value for storage in a [`crate::core::dynamic::DynamicConfig`].
    fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Deserializes from a JSON value previously produced by [`Self::to_value`].
    fn from_value(value: &serde_json::Value) -> ConfigResult<Self> {
        serde_json::from_value(value.clone()).map_err(|e| ConfigError::Serde(e.to_string()))
    }
}
