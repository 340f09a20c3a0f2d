//! The schema type itself.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// The primitive kind a [`Schema`] node describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaType {
    /// Any JSON value; always compatible, never fails validation.
    Any,
    /// A JSON string.
    String,
    /// Any JSON number (integer or float).
    Number,
    /// A JSON number with no fractional part.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// A JSON object with declared (and only declared) `properties`.
    Object,
    /// A JSON array whose elements all match `items`.
    Array,
}

/// A node describing the shape one value (a whole I/O schema, or one
/// property/array-element within it) must have.
///
/// Construct with the `Schema::string()` / `Schema::object()` / ... family
/// and the `with_*` builders; schemas nest via `properties` and `items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    /// The primitive kind.
    #[serde(rename = "type")]
    pub ty: SchemaType,
    /// Property schemas, for [`SchemaType::Object`]. Order-preserving so
    /// error messages and serialized schemas are deterministic.
    #[serde(default)]
    pub properties: IndexMap<String, Schema>,
    /// Names from `properties` that must be present. Unlisted properties
    /// are forbidden per the object's declared shape — extra keys on an
    /// input value are rejected, matching spec.md §3's "object subset"
    /// compatibility rule.
    #[serde(default)]
    pub required: SmallVec<[String; 4]>,
    /// Element schema, for [`SchemaType::Array`].
    #[serde(default)]
    pub items: Option<Box<Schema>>,
}

impl Schema {
    fn leaf(ty: SchemaType) -> Self {
        Self {
            ty,
            properties: IndexMap::new(),
            required: SmallVec::new(),
            items: None,
        }
    }

    /// An unconstrained schema: matches any value, compatible with anything.
    #[must_use]
    pub fn any() -> Self {
        Self::leaf(SchemaType::Any)
    }

    /// A string schema.
    #[must_use]
    pub fn string() -> Self {
        Self::leaf(SchemaType::String)
    }

    /// A number schema (integer or float).
    #[must_use]
    pub fn number() -> Self {
        Self::leaf(SchemaType::Number)
    }

    /// An integer schema.
    #[must_use]
    pub fn integer() -> Self {
        Self::leaf(SchemaType::Integer)
    }

    /// A boolean schema.
    #[must_use]
    pub fn boolean() -> Self {
        Self::leaf(SchemaType::Boolean)
    }

    /// An empty object schema (no properties, nothing required).
    #[must_use]
    pub fn object() -> Self {
        Self::leaf(SchemaType::Object)
    }

    /// An array schema whose elements match `any()`.
    #[must_use]
    pub fn array(items: Schema) -> Self {
        Self {
            ty: SchemaType::Array,
            properties: IndexMap::new(),
            required: SmallVec::new(),
            items: Some(Box::new(items)),
        }
    }

    /// Add a property to an object schema, builder-style.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Mark the given property names as required, builder-style.
    #[must_use]
    pub fn with_required(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.required.extend(names.into_iter().map(Into::into));
        self
    }

    /// Whether this schema declares at least one property or one required
    /// name — the non-empty check spec.md §3 requires for tool node
    /// `input_schema`/`output_schema`.
    #[must_use]
    pub fn is_non_empty(&self) -> bool {
        match self.ty {
            SchemaType::Object => !self.properties.is_empty(),
            SchemaType::Array => self.items.is_some(),
            SchemaType::Any => false,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_builder_accumulates_properties() {
        let schema = Schema::object()
            .with_property("a", Schema::string())
            .with_property("b", Schema::integer())
            .with_required(["a"]);
        assert_eq!(schema.properties.len(), 2);
        assert_eq!(schema.required.as_slice(), ["a"]);
        assert!(schema.is_non_empty());
    }

    #[test]
    fn any_schema_is_considered_empty() {
        assert!(!Schema::any().is_non_empty());
    }

    #[test]
    fn empty_object_is_empty() {
        assert!(!Schema::object().is_non_empty());
    }
}
