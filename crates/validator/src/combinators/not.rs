//! NOT combinator - logical negation of a validator

use crate::core::{Validate, ValidationError, ValidatorMetadata};
use std::borrow::Cow;

/// Inverts a validator: succeeds only when the inner validator fails.
///
/// The success-case error message is generic (`"must fail <name>"`) since
/// the inner validator produced no error to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Not<V> {
    pub(crate) inner: V,
}

impl<V> Not<V> {
    pub fn new(inner: V) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> V {
        self.inner
    }
}

impl<V> Validate for Not<V>
where
    V: Validate,
{
    type Input = V::Input;

    fn validate(&self, input: &Self::Input) -> Result<(), ValidationError> {
        match self.inner.validate(input) {
            Ok(()) => Err(ValidationError::custom(
                "not",
                "",
                format!("expected `{}` to fail, but it passed", self.inner.metadata().name),
            )),
            Err(_) => Ok(()),
        }
    }

    fn metadata(&self) -> ValidatorMetadata {
        let inner_meta = self.inner.metadata();
        ValidatorMetadata {
            name: format!("Not({})", inner_meta.name).into(),
            description: Some(format!("Must not satisfy {}", inner_meta.name).into()),
            complexity: inner_meta.complexity,
            cacheable: inner_meta.cacheable,
            estimated_time: None,
            tags: {
                let mut tags = inner_meta.tags;
                tags.push(Cow::Borrowed("combinator"));
                tags
            },
            version: None,
            custom: Vec::new(),
        }
    }
}

/// Invert a validator.
pub fn not<V>(inner: V) -> Not<V>
where
    V: Validate,
{
    Not::new(inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::ValidateExt;

    struct Blank;
    impl Validate for Blank {
        type Input = str;
        fn validate(&self, input: &str) -> Result<(), ValidationError> {
            if input.is_empty() {
                Ok(())
            } else {
                Err(ValidationError::custom("not_blank", "", "must be blank"))
            }
        }
    }

    #[test]
    fn not_inverts_success() {
        let validator = Not::new(Blank);
        assert!(validator.validate("hello").is_ok());
        assert!(validator.validate("").is_err());
    }

    #[test]
    fn not_chain_via_ext() {
        let validator = Blank.not();
        assert!(validator.validate("hello").is_ok());
    }
}
