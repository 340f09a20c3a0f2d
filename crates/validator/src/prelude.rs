//! Convenience re-exports: `use nebula_validator::prelude::*;`

pub use crate::combinators::{And, Cached, Not, Or, and, and_all, cached, not, or};
pub use crate::core::{Validate, ValidateExt, ValidationComplexity, ValidationError, ValidatorMetadata};
pub use crate::validators::{MaxLength, MinLength, Pattern, Range, Required, RequiredValue, max_length, min_length, pattern, range};
