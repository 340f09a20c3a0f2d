//! Combinators for composing [`Validate`](crate::core::Validate) implementors.

pub mod and;
pub mod cached;
pub mod not;
pub mod or;

pub use and::{And, AndAll, and, and_all};
pub use cached::{CacheStats, Cached, cached};
pub use not::{Not, not};
pub use or::{Or, or};
