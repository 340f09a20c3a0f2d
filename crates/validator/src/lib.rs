//! # Nebula Validator
//!
//! A small, composable validation framework built around a single
//! [`core::Validate`] trait. Leaf validators (length, range, pattern,
//! presence) are combined with [`combinators`] (`and`, `or`, `not`,
//! `cached`) rather than written as monolithic checks.
//!
//! ```
//! use nebula_validator::prelude::*;
//!
//! let username = MinLength::new(3).and(MaxLength::new(32));
//! assert!(username.validate("alice").is_ok());
//! assert!(username.validate("ab").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// The [`Validate`](core::Validate) trait, [`ValidationError`](core::ValidationError),
/// and [`ValidatorMetadata`](core::ValidatorMetadata).
pub mod core;
/// `And`/`Or`/`Not`/`Cached` combinators for composing validators.
pub mod combinators;
/// Built-in leaf validators (length, range, pattern, required).
pub mod validators;
/// Convenience re-exports for validator authors.
pub mod prelude;

pub use core::{Validate, ValidateExt, ValidationComplexity, ValidationError, ValidatorMetadata};
