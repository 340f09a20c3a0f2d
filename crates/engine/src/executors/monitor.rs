//! `monitor` node dispatch: evaluate an expression without gating flow.
//!
//! A real monitor would re-evaluate `expr` every `interval` for the life of
//! the execution; this engine has no background-tick scheduler, so it
//! evaluates once per dispatch and always succeeds, carrying the boolean
//! result in the output rather than branching on it. Downstream nodes that
//! care about the result read `output.triggered`.

use nebula_action::result::ActionResult;
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
    let NodeKind::Monitor { expr, interval } = &node.kind else {
        unreachable!("dispatch only routes Monitor nodes here");
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

    Ok(ActionResult::success(json!({
        "input": input,
        "triggered": value,
        "interval_ms": interval.as_millis() as u64,
    })))
}
