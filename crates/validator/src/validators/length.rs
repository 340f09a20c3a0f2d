//! String/collection length validators.

use crate::core::{Validate, ValidationComplexity, ValidationError, ValidatorMetadata};

/// Validates that a string's character count is at least `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinLength {
    min: usize,
}

impl MinLength {
    /// Require at least `min` characters.
    #[must_use]
    pub fn new(min: usize) -> Self {
        Self { min }
    }
}

impl Validate for MinLength {
    type Input = str;

    fn validate(&self, input: &str) -> Result<(), ValidationError> {
        let len = input.chars().count();
        if len >= self.min {
            Ok(())
        } else {
            Err(ValidationError::min_length("", self.min, len))
        }
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata::new("min_length")
            .with_description(format!("at least {} characters", self.min))
            .with_complexity(ValidationComplexity::Linear)
            .with_tag("string")
    }
}

/// Validates that a string's character count is at most `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxLength {
    max: usize,
}

impl MaxLength {
    /// Require at most `max` characters.
    #[must_use]
    pub fn new(max: usize) -> Self {
        Self { max }
    }
}

impl Validate for MaxLength {
    type Input = str;

    fn validate(&self, input: &str) -> Result<(), ValidationError> {
        let len = input.chars().count();
        if len <= self.max {
            Ok(())
        } else {
            Err(ValidationError::max_length("", self.max, len))
        }
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata::new("max_length")
            .with_description(format!("at most {} characters", self.max))
            .with_complexity(ValidationComplexity::Linear)
            .with_tag("string")
    }
}

/// Convenience constructor for [`MinLength`].
#[must_use]
pub fn min_length(min: usize) -> MinLength {
    MinLength::new(min)
}

/// Convenience constructor for [`MaxLength`].
#[must_use]
pub fn max_length(max: usize) -> MaxLength {
    MaxLength::new(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::ValidateExt;

    #[test]
    fn min_length_rejects_short_strings() {
        assert!(MinLength::new(3).validate("hi").is_err());
        assert!(MinLength::new(3).validate("hey").is_ok());
    }

    #[test]
    fn max_length_rejects_long_strings() {
        assert!(MaxLength::new(3).validate("hey").is_ok());
        assert!(MaxLength::new(3).validate("heyy").is_err());
    }

    #[test]
    fn counts_chars_not_bytes() {
        assert!(MinLength::new(2).validate("héllo").is_ok());
    }

    #[test]
    fn composes_via_and() {
        let validator = MinLength::new(2).and(MaxLength::new(5));
        assert!(validator.validate("abc").is_ok());
        assert!(validator.validate("a").is_err());
        assert!(validator.validate("abcdef").is_err());
    }
}
