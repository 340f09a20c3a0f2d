//! Validation error type.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A single parameter attached to a [`ValidationError`] (e.g. `min`, `actual`).
pub type ErrorParam = (Cow<'static, str>, serde_json::Value);

/// A validation failure.
///
/// Carries a stable `code` (for machine matching), the `field` that
/// failed (empty string for whole-value validators), a human-readable
/// `message`, and a small set of structured `params` describing the
/// failure (e.g. `min_length` carries `min` and `actual`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Stable machine-readable failure code, e.g. `"min_length"`.
    pub code: Cow<'static, str>,
    /// The field path this error applies to. Empty for whole-value checks.
    pub field: String,
    /// Human-readable description.
    pub message: String,
    /// Structured parameters describing the failure.
    pub params: SmallVec<[ErrorParam; 4]>,
}

impl ValidationError {
    /// Build a validation error from its parts.
    pub fn new(code: impl Into<Cow<'static, str>>, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            field: field.into(),
            message: message.into(),
            params: SmallVec::new(),
        }
    }

    /// Attach a structured parameter to this error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<Cow<'static, str>>, value: impl Into<serde_json::Value>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// A required field was missing.
    pub fn required(field: impl Into<String>) -> Self {
        Self::new("required", field, "value is required")
    }

    /// A string/collection was shorter than `min`.
    pub fn min_length(field: impl Into<String>, min: usize, actual: usize) -> Self {
        Self::new(
            "min_length",
            field,
            format!("length {actual} is below minimum {min}"),
        )
        .with_param("min", min as u64)
        .with_param("actual", actual as u64)
    }

    /// A string/collection was longer than `max`.
    pub fn max_length(field: impl Into<String>, max: usize, actual: usize) -> Self {
        Self::new(
            "max_length",
            field,
            format!("length {actual} exceeds maximum {max}"),
        )
        .with_param("max", max as u64)
        .with_param("actual", actual as u64)
    }

    /// A numeric value fell outside `[min, max]`.
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        Self::new(
            "out_of_range",
            field,
            format!("value {actual} is outside range [{min}, {max}]"),
        )
        .with_param("min", min)
        .with_param("max", max)
        .with_param("actual", actual)
    }

    /// A value did not match the expected type.
    pub fn type_mismatch(field: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        let expected = expected.into();
        let actual = actual.into();
        Self::new(
            "type_mismatch",
            field,
            format!("expected type `{expected}`, found `{actual}`"),
        )
        .with_param("expected", expected.clone())
        .with_param("actual", actual.clone())
    }

    /// A string did not match a required pattern.
    pub fn pattern_mismatch(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        Self::new(
            "pattern_mismatch",
            field,
            format!("value does not match pattern `{pattern}`"),
        )
        .with_param("pattern", pattern.clone())
    }

    /// A value was not one of an allowed set.
    pub fn not_allowed(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new("not_allowed", field, message)
    }

    /// A catch-all for validators with bespoke failure messages.
    pub fn custom(code: impl Into<Cow<'static, str>>, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, field, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_length_carries_params() {
        let err = ValidationError::min_length("name", 3, 1);
        assert_eq!(err.code, "min_length");
        assert_eq!(err.field, "name");
        assert!(err.params.iter().any(|(k, v)| k == "min" && v == &serde_json::json!(3)));
    }

    #[test]
    fn display_uses_message() {
        let err = ValidationError::required("email");
        assert_eq!(err.to_string(), "value is required");
    }
}
