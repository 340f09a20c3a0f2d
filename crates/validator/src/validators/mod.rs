//! Built-in leaf validators for common string/numeric/JSON checks.

pub mod length;
pub mod pattern;
pub mod range;
pub mod required;

pub use length::{MaxLength, MinLength, max_length, min_length};
pub use pattern::{Pattern, pattern};
pub use range::{Range, range};
pub use required::{Required, RequiredValue};
