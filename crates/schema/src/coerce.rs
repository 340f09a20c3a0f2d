//! Unambiguous scalar coercions used by [`crate::validate`].

use serde_json::{Number, Value};

use crate::types::SchemaType;

/// Coerce `value` to `ty` when the conversion is lossless and unambiguous.
///
/// Returns `None` when `value` already matches `ty`, is coercible, but
/// for nothing else — mismatches that would require guessing (e.g. a
/// non-numeric string into a number) are left to the caller to report.
pub(crate) fn coerce_scalar(ty: SchemaType, value: &Value) -> Option<Value> {
    match ty {
        SchemaType::String => coerce_to_string(value),
        SchemaType::Number => coerce_to_number(value).map(Value::Number),
        SchemaType::Integer => coerce_to_integer(value),
        SchemaType::Boolean => match value {
            Value::Bool(_) => Some(value.clone()),
            _ => None,
        },
        SchemaType::Any | SchemaType::Object | SchemaType::Array => None,
    }
}

fn coerce_to_string(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Number(n) => Some(Value::String(n.to_string())),
        Value::Bool(b) => Some(Value::String(b.to_string())),
        _ => None,
    }
}

fn coerce_to_number(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(Number::from_f64),
        _ => None,
    }
}

fn coerce_to_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
        Value::Number(n) => {
            let f = n.as_f64()?;
            if f.fract() == 0.0 {
                Some(Value::Number(Number::from(f as i64)))
            } else {
                None
            }
        }
        Value::String(s) => s.trim().parse::<i64>().ok().map(|i| Value::Number(Number::from(i))),
        _ => None,
    }
}
