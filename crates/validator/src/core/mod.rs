//! Core validator abstractions: the [`Validate`] trait, error type, and metadata.

pub mod error;
pub mod metadata;
pub mod traits;

pub use error::ValidationError;
pub use metadata::{ValidationComplexity, ValidatorMetadata};
pub use traits::{Validate, ValidateExt};
