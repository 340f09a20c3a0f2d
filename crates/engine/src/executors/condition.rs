//! `condition` node dispatch: evaluate a boolean expression, branch.

use nebula_action::result::{ActionResult, BranchKey};
use nebula_expression::EvaluationContext;
use nebula_workflow::{NodeDefinition, NodeKind};
use serde_json::json;

use super::ExecutorCtx;
use crate::error::EngineError;

pub(super) async fn execute(
    node: &NodeDefinition,
    input: serde_json::Value,
    ctx: &ExecutorCtx,
) -> Result<ActionResult<serde_json::Value>, EngineError> {
    let NodeKind::Condition { expr } = &node.kind else {
        unreachable!("dispatch only routes Condition nodes here");
    };

    let mut eval_ctx = EvaluationContext::new();
    eval_ctx.set_input(input.clone());
    for entry in ctx.outputs.iter() {
        eval_ctx.set_node_data(entry.key().to_string(), entry.value().clone());
    }

    let value = ctx
        .expression_engine
        .evaluate(expr, &eval_ctx)
        .map_err(|e| EngineError::ParameterResolution {
            node_id: node.id,
            param_key: "expr".to_owned(),
            error: e.to_string(),
        })?;

    let truthy = is_truthy(&value);
    let selected: BranchKey = if truthy { "true" } else { "false" }.to_owned();

    Ok(ActionResult::Branch {
        selected,
        output: input,
        alternatives: std::collections::HashMap::new(),
    })
}

pub(super) fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Null => false,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(a) => !a.is_empty(),
        serde_json::Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_empty_values_are_falsy() {
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(null)));
    }

    #[test]
    fn non_empty_values_are_truthy() {
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!([1])));
    }
}
