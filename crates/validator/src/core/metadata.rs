//! Metadata describing a validator's shape, independent of its logic.

use std::borrow::Cow;
use std::time::Duration;

/// Relative cost of evaluating a validator, used by combinators to decide
/// ordering (cheap checks run before expensive ones) and by [`Cached`]
/// wrappers to decide whether caching is worthwhile.
///
/// [`Cached`]: crate::combinators::cached::Cached
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValidationComplexity {
    /// O(1) after any setup cost — field presence, equality, cached lookups.
    Constant,
    /// O(n) in the input size — length checks, simple scans.
    Linear,
    /// O(n log n) — sorting-backed or compiled-regex checks.
    Logarithmic,
    /// O(n^2) or worse, or I/O-bound — cross-field or external checks.
    Quadratic,
}

impl ValidationComplexity {
    /// Combine two complexities, taking the more expensive of the two.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        std::cmp::max(self, other)
    }
}

/// A single piece of free-form metadata not covered by the named fields.
pub type CustomMetadata = (Cow<'static, str>, serde_json::Value);

/// Static description of a validator, used for introspection, docs
/// generation, and combinator bookkeeping (tags, cacheability).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorMetadata {
    /// Short machine name, e.g. `"min_length"`.
    pub name: Cow<'static, str>,
    /// Human-readable description, if any.
    pub description: Option<Cow<'static, str>>,
    /// Relative evaluation cost.
    pub complexity: ValidationComplexity,
    /// Whether the result of evaluating this validator is safe to cache,
    /// i.e. depends only on its input (no ambient/time-varying state).
    pub cacheable: bool,
    /// Measured or estimated per-call latency, if known.
    pub estimated_time: Option<Duration>,
    /// Free-form tags (e.g. `"string"`, `"combinator"`) for discovery.
    pub tags: Vec<Cow<'static, str>>,
    /// Version of the validator's rule set, if it evolves independently
    /// of the crate version (e.g. a regex pattern library version).
    pub version: Option<Cow<'static, str>>,
    /// Additional key/value metadata for bespoke validators.
    pub custom: Vec<CustomMetadata>,
}

impl ValidatorMetadata {
    /// Build metadata for a leaf validator.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            description: None,
            complexity: ValidationComplexity::Linear,
            cacheable: true,
            estimated_time: None,
            tags: Vec::new(),
            version: None,
            custom: Vec::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the complexity.
    #[must_use]
    pub fn with_complexity(mut self, complexity: ValidationComplexity) -> Self {
        self.complexity = complexity;
        self
    }

    /// Set cacheability.
    #[must_use]
    pub fn with_cacheable(mut self, cacheable: bool) -> Self {
        self.cacheable = cacheable;
        self
    }

    /// Add a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<Cow<'static, str>>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complexity_max_picks_more_expensive() {
        assert_eq!(
            ValidationComplexity::Constant.max(ValidationComplexity::Logarithmic),
            ValidationComplexity::Logarithmic
        );
    }

    #[test]
    fn builder_accumulates_tags() {
        let meta = ValidatorMetadata::new("x").with_tag("a").with_tag("b");
        assert_eq!(meta.tags.len(), 2);
    }
}
