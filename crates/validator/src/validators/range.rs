//! Numeric range validators.

use crate::core::{Validate, ValidationComplexity, ValidationError, ValidatorMetadata};

/// Validates that an `f64` falls within `[min, max]` inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    min: f64,
    max: f64,
}

impl Range {
    /// Require the value to fall within `[min, max]`.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl Validate for Range {
    type Input = f64;

    fn validate(&self, input: &f64) -> Result<(), ValidationError> {
        if *input >= self.min && *input <= self.max {
            Ok(())
        } else {
            Err(ValidationError::out_of_range("", self.min, self.max, *input))
        }
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata::new("range")
            .with_description(format!("between {} and {}", self.min, self.max))
            .with_complexity(ValidationComplexity::Constant)
            .with_tag("numeric")
    }
}

/// Convenience constructor for [`Range`].
#[must_use]
pub fn range(min: f64, max: f64) -> Range {
    Range::new(min, max)
}
