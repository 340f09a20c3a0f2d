//! Schema validation: does a value conform, with unambiguous coercion.

use serde_json::Value;

use crate::coerce::coerce_scalar;
use crate::types::{Schema, SchemaType};
use nebula_validator::core::error::ValidationError;

impl Schema {
    /// Validate (and where unambiguous, coerce) `value` against this
    /// schema, returning the coerced value on success.
    ///
    /// Coercion rules (spec.md §4.5): an integer-valued number coerces to
    /// a string schema and vice versa when the string parses cleanly; a
    /// bare scalar/object coerces into a one-element array when the
    /// schema expects an array; a JSON string containing an object/array
    /// literal coerces into that shape when the schema expects it.
    ///
    /// # Errors
    ///
    /// Returns every [`ValidationError`] found (missing required
    /// properties, type mismatches that cannot be coerced) rather than
    /// stopping at the first.
    pub fn validate(&self, value: &Value) -> Result<Value, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let coerced = self.validate_at("", value, &mut errors);
        if errors.is_empty() {
            Ok(coerced)
        } else {
            Err(errors)
        }
    }

    fn validate_at(&self, path: &str, value: &Value, errors: &mut Vec<ValidationError>) -> Value {
        match self.ty {
            SchemaType::Any => value.clone(),
            SchemaType::Object => self.validate_object(path, value, errors),
            SchemaType::Array => self.validate_array(path, value, errors),
            SchemaType::String | SchemaType::Number | SchemaType::Integer | SchemaType::Boolean => {
                match coerce_scalar(self.ty, value) {
                    Some(coerced) => coerced,
                    None => {
                        errors.push(ValidationError::type_mismatch(
                            path,
                            format!("{:?}", self.ty),
                            describe(value),
                        ));
                        value.clone()
                    }
                }
            }
        }
    }

    fn validate_object(&self, path: &str, value: &Value, errors: &mut Vec<ValidationError>) -> Value {
        let Some(obj) = value.as_object() else {
            errors.push(ValidationError::type_mismatch(path, "object", describe(value)));
            return value.clone();
        };

        for required in &self.required {
            if !obj.contains_key(required.as_str()) {
                let field = join_path(path, required);
                errors.push(ValidationError::required(field));
            }
        }

        let mut out = serde_json::Map::new();
        for (key, val) in obj {
            let field = join_path(path, key);
            match self.properties.get(key) {
                Some(prop_schema) => out.insert(key.clone(), prop_schema.validate_at(&field, val, errors)),
                None => out.insert(key.clone(), val.clone()),
            };
        }
        Value::Object(out)
    }

    fn validate_array(&self, path: &str, value: &Value, errors: &mut Vec<ValidationError>) -> Value {
        let Some(item_schema) = &self.items else {
            return value.clone();
        };
        let arr = match value.as_array() {
            Some(arr) => arr.clone(),
            None => vec![value.clone()],
        };
        let coerced: Vec<Value> = arr
            .iter()
            .enumerate()
            .map(|(i, item)| item_schema.validate_at(&format!("{path}[{i}]"), item, errors))
            .collect();
        Value::Array(coerced)
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_owned()
    } else {
        format!("{prefix}.{field}")
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_required_property_is_reported() {
        let schema = Schema::object().with_property("name", Schema::string()).with_required(["name"]);
        let errs = schema.validate(&json!({})).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, "required");
    }

    #[test]
    fn nested_type_mismatch_reports_dotted_path() {
        let schema = Schema::object().with_property("count", Schema::integer());
        let errs = schema.validate(&json!({"count": "not a number"})).unwrap_err();
        assert_eq!(errs[0].field, "count");
    }

    #[test]
    fn bare_scalar_promotes_to_one_element_array() {
        let schema = Schema::array(Schema::string());
        let value = schema.validate(&json!("solo")).unwrap();
        assert_eq!(value, json!(["solo"]));
    }

    #[test]
    fn extra_properties_pass_through_unchanged() {
        let schema = Schema::object().with_property("a", Schema::string());
        let value = schema.validate(&json!({"a": "x", "b": 1})).unwrap();
        assert_eq!(value["b"], json!(1));
    }
}
