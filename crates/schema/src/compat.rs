//! Edge compatibility: can a producer's schema flow into a consumer's.

use crate::types::{Schema, SchemaType};

impl Schema {
    /// Whether a value matching `self` (the producer's declared schema,
    /// e.g. an upstream node's `output_schema`) can flow into a
    /// parameter declared by `other` (the consumer's `input_schema`).
    ///
    /// Per spec.md §3/§4.3 phase 4: primitive equality, or — for
    /// objects — the producer's properties being a subset of the
    /// consumer's declared shape (every property the consumer requires
    /// must be present and compatible on the producer side). Either
    /// side being [`SchemaType::Any`] is always compatible.
    #[must_use]
    pub fn is_compatible_with(&self, other: &Schema) -> bool {
        if self.ty == SchemaType::Any || other.ty == SchemaType::Any {
            return true;
        }
        if self.ty != other.ty {
            return false;
        }
        match self.ty {
            SchemaType::Object => other.required.iter().all(|name| match (self.properties.get(name), other.properties.get(name)) {
                (Some(producer_prop), Some(consumer_prop)) => producer_prop.is_compatible_with(consumer_prop),
                _ => false,
            }),
            SchemaType::Array => match (&self.items, &other.items) {
                (Some(a), Some(b)) => a.is_compatible_with(b),
                (None, None) => true,
                _ => false,
            },
            _ => true,
        }
    }
}
