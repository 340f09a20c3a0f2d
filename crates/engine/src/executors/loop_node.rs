//! `loop` node dispatch: run `body` repeatedly, bounded by
//! `max_iterations`, stopping early when `condition` evaluates falsy.

use nebula_action::result::{ActionResult, BreakReason};
use nebula_expression::EvaluationContext;
use nebula_workflow::{NodeDefinition, NodeKind};
use serde_json::json;

use super::{ExecutorCtx, run_sequence};
use crate::error::EngineError;

pub(super) async fn execute(
    node: &NodeDefinition,
    input: serde_json::Value,
    ctx: &ExecutorCtx,
) -> Result<ActionResult<serde_json::Value>, EngineError> {
    let NodeKind::Loop {
        body,
        max_iterations,
        condition,
    } = &node.kind
    else {
        unreachable!("dispatch only routes Loop nodes here");
    };

    let mut current = input;
    let mut iterations = 0u32;
    let mut reason = BreakReason::MaxIterations;

    while iterations < *max_iterations {
        if ctx.cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let nested = ctx.nested()?;
        current = run_sequence(body, current, &nested).await?;
        iterations += 1;

        if let Some(expr) = condition {
            let mut eval_ctx = EvaluationContext::new();
            eval_ctx.set_input(current.clone());
            for entry in ctx.outputs.iter() {
                eval_ctx.set_node_data(entry.key().to_string(), entry.value().clone());
            }
            let value = ctx
                .expression_engine
                .evaluate(expr, &eval_ctx)
                .map_err(|e| EngineError::ParameterResolution {
                    node_id: node.id,
                    param_key: "condition".to_owned(),
                    error: e.to_string(),
                })?;
            if !super::condition::is_truthy(&value) {
                reason = BreakReason::ConditionMet;
                break;
            }
        }
    }

    Ok(ActionResult::Break {
        output: json!({ "output": current, "iterations": iterations }),
        reason,
    })
}
