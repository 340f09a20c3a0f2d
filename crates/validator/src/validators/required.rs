//! Presence / non-empty validators.

use crate::core::{Validate, ValidationComplexity, ValidationError, ValidatorMetadata};

/// Validates that a string is non-empty once trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Required;

impl Validate for Required {
    type Input = str;

    fn validate(&self, input: &str) -> Result<(), ValidationError> {
        if input.trim().is_empty() {
            Err(ValidationError::required(""))
        } else {
            Ok(())
        }
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata::new("required")
            .with_description("must not be blank")
            .with_complexity(ValidationComplexity::Constant)
            .with_tag("string")
    }
}

/// Validates that a [`serde_json::Value`] is not `Null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequiredValue;

impl Validate for RequiredValue {
    type Input = serde_json::Value;

    fn validate(&self, input: &serde_json::Value) -> Result<(), ValidationError> {
        if input.is_null() {
            Err(ValidationError::required(""))
        } else {
            Ok(())
        }
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata::new("required_value")
            .with_description("must not be null")
            .with_complexity(ValidationComplexity::Constant)
            .with_tag("json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_strings() {
        assert!(Required.validate("").is_err());
        assert!(Required.validate("   ").is_err());
        assert!(Required.validate("x").is_ok());
    }

    #[test]
    fn rejects_null_json() {
        assert!(RequiredValue.validate(&serde_json::Value::Null).is_err());
        assert!(RequiredValue.validate(&serde_json::json!(0)).is_ok());
    }
}
