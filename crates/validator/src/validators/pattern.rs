//! Regex-backed pattern validator.

use regex::Regex;

use crate::core::{Validate, ValidationComplexity, ValidationError, ValidatorMetadata};

/// Validates that a string matches a compiled regular expression.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    label: String,
}

impl Pattern {
    /// Compile `pattern` into a new [`Pattern`] validator.
    ///
    /// # Errors
    ///
    /// Returns the underlying `regex::Error` if `pattern` does not compile.
    pub fn new(pattern: impl AsRef<str>) -> Result<Self, regex::Error> {
        let pattern = pattern.as_ref();
        Ok(Self {
            regex: Regex::new(pattern)?,
            label: pattern.to_string(),
        })
    }
}

impl Validate for Pattern {
    type Input = str;

    fn validate(&self, input: &str) -> Result<(), ValidationError> {
        if self.regex.is_match(input) {
            Ok(())
        } else {
            Err(ValidationError::pattern_mismatch("", self.label.clone()))
        }
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata::new("pattern")
            .with_description(format!("matches /{}/", self.label))
            .with_complexity(ValidationComplexity::Logarithmic)
            .with_tag("string")
    }
}

/// Compile a [`Pattern`] validator from `pattern`.
///
/// # Errors
///
/// Returns the underlying `regex::Error` if `pattern` does not compile.
pub fn pattern(pattern_str: impl AsRef<str>) -> Result<Pattern, regex::Error> {
    Pattern::new(pattern_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_digits() {
        let validator = Pattern::new(r"^\d+$").unwrap();
        assert!(validator.validate("12345").is_ok());
        assert!(validator.validate("12a45").is_err());
    }

    #[test]
    fn invalid_pattern_errors_at_construction() {
        assert!(Pattern::new("(unclosed").is_err());
    }
}
