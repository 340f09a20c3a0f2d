//! Miscellaneous builtins: length, type predicates, uuid generation.

use serde_json::Value;

use super::check_arg_count;
use crate::ExpressionError;
use crate::context::EvaluationContext;
use crate::core::error::{ExpressionErrorExt, ExpressionResult};
use crate::eval::Evaluator;

pub fn length(args: &[Value], _evaluator: &Evaluator, _context: &EvaluationContext) -> ExpressionResult<Value> {
    check_arg_count("length", args, 1)?;
    match &args[0] {
        Value::String(s) => Ok(Value::Number((s.chars().count() as u64).into())),
        Value::Array(arr) => Ok(Value::Number((arr.len() as u64).into())),
        other => Err(ExpressionError::expression_type_error(
            "string or array",
            crate::value_utils::value_type_name(other),
        )),
    }
}

pub fn is_null(args: &[Value], _evaluator: &Evaluator, _context: &EvaluationContext) -> ExpressionResult<Value> {
    check_arg_count("is_null", args, 1)?;
    Ok(Value::Bool(args[0].is_null()))
}

pub fn is_array(args: &[Value], _evaluator: &Evaluator, _context: &EvaluationContext) -> ExpressionResult<Value> {
    check_arg_count("is_array", args, 1)?;
    Ok(Value::Bool(args[0].is_array()))
}

pub fn is_object(args: &[Value], _evaluator: &Evaluator, _context: &EvaluationContext) -> ExpressionResult<Value> {
    check_arg_count("is_object", args, 1)?;
    Ok(Value::Bool(args[0].is_object()))
}

pub fn is_string(args: &[Value], _evaluator: &Evaluator, _context: &EvaluationContext) -> ExpressionResult<Value> {
    check_arg_count("is_string", args, 1)?;
    Ok(Value::Bool(args[0].is_string()))
}

pub fn is_number(args: &[Value], _evaluator: &Evaluator, _context: &EvaluationContext) -> ExpressionResult<Value> {
    check_arg_count("is_number", args, 1)?;
    Ok(Value::Bool(args[0].is_number()))
}

#[cfg(feature = "uuid")]
pub fn uuid(args: &[Value], _evaluator: &Evaluator, _context: &EvaluationContext) -> ExpressionResult<Value> {
    check_arg_count("uuid", args, 0)?;
    Ok(Value::String(uuid::Uuid::new_v4().to_string()))
}

#[cfg(not(feature = "uuid"))]
pub fn uuid(_args: &[Value], _evaluator: &Evaluator, _context: &EvaluationContext) -> ExpressionResult<Value> {
    Err(ExpressionError::expression_function_not_found(
        "uuid (enable the 'uuid' feature)",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::BuiltinRegistry;
    use std::sync::Arc;

    fn eval_args() -> (Evaluator, EvaluationContext) {
        (Evaluator::new(Arc::new(BuiltinRegistry::new())), EvaluationContext::new())
    }

    #[test]
    fn length_counts_strings_and_arrays() {
        let (evaluator, context) = eval_args();
        assert_eq!(
            length(&[Value::String("hello".into())], &evaluator, &context).unwrap(),
            serde_json::json!(5)
        );
        assert_eq!(
            length(&[serde_json::json!([1, 2, 3])], &evaluator, &context).unwrap(),
            serde_json::json!(3)
        );
    }

    #[test]
    fn length_rejects_unsupported_types() {
        let (evaluator, context) = eval_args();
        assert!(length(&[Value::Number(1.into())], &evaluator, &context).is_err());
    }

    #[test]
    fn type_predicates() {
        let (evaluator, context) = eval_args();
        assert_eq!(is_null(&[Value::Null], &evaluator, &context).unwrap(), Value::Bool(true));
        assert_eq!(
            is_array(&[serde_json::json!([1])], &evaluator, &context).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            is_object(&[serde_json::json!({})], &evaluator, &context).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            is_string(&[Value::String("x".into())], &evaluator, &context).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(is_number(&[Value::Number(1.into())], &evaluator, &context).unwrap(), Value::Bool(true));
    }
}
