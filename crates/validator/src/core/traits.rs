//! The core [`Validate`] trait and its combinator-chaining extension.

use super::error::ValidationError;
use super::metadata::ValidatorMetadata;

/// A synchronous, composable validator over a single input type.
///
/// Implementors check `Self::Input` against some rule and return `Ok(())`
/// on success or an `Err(ValidationError)` describing the failure.
/// Validators are meant to be small and combined via [`ValidateExt`]
/// (`.and()`, `.or()`, `.not()`, `.cached()`) rather than written as large
/// monolithic checks.
pub trait Validate: Send + Sync {
    /// The type this validator checks.
    type Input: ?Sized;

    /// Run the validation, returning the first failure encountered.
    fn validate(&self, input: &Self::Input) -> Result<(), ValidationError>;

    /// Static metadata describing this validator (name, cost, tags).
    ///
    /// The default implementation returns a generic, untagged descriptor;
    /// concrete validators should override it.
    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata::new("validator").with_description("unnamed validator")
    }
}

impl<T: ?Sized> Validate for &T
where
    T: Validate,
{
    type Input = T::Input;

    fn validate(&self, input: &Self::Input) -> Result<(), ValidationError> {
        (**self).validate(input)
    }

    fn metadata(&self) -> ValidatorMetadata {
        (**self).metadata()
    }
}

impl<T: ?Sized> Validate for Box<T>
where
    T: Validate,
{
    type Input = T::Input;

    fn validate(&self, input: &Self::Input) -> Result<(), ValidationError> {
        (**self).validate(input)
    }

    fn metadata(&self) -> ValidatorMetadata {
        (**self).metadata()
    }
}

/// Combinator-chaining methods available on every [`Validate`] implementor.
pub trait ValidateExt: Validate + Sized {
    /// Combine with `other`, requiring both to succeed.
    fn and<R>(self, other: R) -> crate::combinators::and::And<Self, R>
    where
        R: Validate<Input = Self::Input>,
    {
        crate::combinators::and::And::new(self, other)
    }

    /// Combine with `other`, requiring at least one to succeed.
    fn or<R>(self, other: R) -> crate::combinators::or::Or<Self, R>
    where
        R: Validate<Input = Self::Input>,
    {
        crate::combinators::or::Or::new(self, other)
    }

    /// Invert the result: succeeds only when `self` fails.
    fn not(self) -> crate::combinators::not::Not<Self> {
        crate::combinators::not::Not::new(self)
    }

    /// Wrap in a cache keyed by the hash of the input.
    fn cached(self) -> crate::combinators::cached::Cached<Self>
    where
        Self::Input: std::hash::Hash + Sized,
    {
        crate::combinators::cached::Cached::new(self)
    }
}

impl<T: Validate> ValidateExt for T {}
