#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Schema
//!
//! A small, explicit JSON-schema subset used to describe node `input_schema`
//! / `output_schema` declarations (spec component C2) and to check
//! schema-compatibility across a workflow edge (spec component C3, phase 4).
//!
//! Deliberately not a general-purpose JSON-schema implementation: only the
//! primitives a blueprint author needs (object/array/string/number/integer/
//! boolean/any, `required`, nested `properties`/`items`) and the two
//! operations the engine actually performs against them:
//!
//! - [`Schema::validate`] — does a value conform, producing coerced output
//!   when a conversion is unambiguous (int↔str, numeric-looking string, a
//!   bare value promoted into a one-element array).
//! - [`Schema::is_compatible_with`] — can a value declared by this schema
//!   flow into a parameter declared by another (primitive equality, or an
//!   object whose declared properties are a subset of the consumer's).

mod coerce;
mod compat;
mod types;
mod validate;

pub use types::{Schema, SchemaType};

pub use nebula_validator::core::error::ValidationError;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_schema_validates_required_properties() {
        let schema = Schema::object()
            .with_property("name", Schema::string())
            .with_required(["name"]);

        assert!(schema.validate(&json!({"name": "ada"})).is_ok());
        assert!(schema.validate(&json!({})).is_err());
    }

    #[test]
    fn compatibility_checks_primitive_equality() {
        assert!(Schema::string().is_compatible_with(&Schema::string()));
        assert!(!Schema::string().is_compatible_with(&Schema::integer()));
        assert!(Schema::any().is_compatible_with(&Schema::string()));
    }
}
