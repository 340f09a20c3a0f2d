//! `agent` node dispatch: a bounded think/act loop against the node's
//! registered [`AgentBrain`], invoking tools through the same
//! [`ActionRuntime`](nebula_runtime::ActionRuntime) a `tool` node uses.

use std::sync::Arc;

use nebula_action::context::ActionContext;
use nebula_action::result::ActionResult;
use nebula_core::scope::ScopeLevel;
use nebula_ports::{AgentAction, AgentBrain};
use nebula_workflow::{NodeDefinition, NodeKind, RegistrySpace};
use serde_json::json;

use super::ExecutorCtx;
use crate::error::EngineError;

/// Concrete, downcastable handle for a registered [`AgentBrain`], mirroring
/// [`super::llm::LlmProviderHandle`]'s role for LLM providers.
pub struct AgentBrainHandle(pub Arc<dyn AgentBrain>);

pub(super) async fn execute(
    node: &NodeDefinition,
    input: serde_json::Value,
    ctx: &ExecutorCtx,
) -> Result<ActionResult<serde_json::Value>, EngineError> {
    let NodeKind::Agent {
        agent_class,
        tools,
        max_steps,
        params,
    } = &node.kind
    else {
        unreachable!("dispatch only routes Agent nodes here");
    };

    let registry = ctx
        .registry
        .as_ref()
        .ok_or(EngineError::ProviderNotConfigured { node_id: node.id })?;

    let resolved_params = ctx
        .resolver
        .resolve(node.id, params, &input, ctx.outputs)?
        .unwrap_or(input.clone());

    let brain = registry
        .resolve(RegistrySpace::Agent, agent_class)
        .map_err(|e| EngineError::NodeFailed {
            node_id: node.id,
            error: e.to_string(),
        })?
        .downcast::<AgentBrainHandle>()
        .map_err(|_| EngineError::NodeFailed {
            node_id: node.id,
            error: format!("`{agent_class}` is not a registered agent brain handle"),
        })?;

    let mut transcript = vec![json!({"goal": resolved_params})];
    let mut last_output = serde_json::Value::Null;

    for step in 0..*max_steps {
        if ctx.cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let context = json!({"transcript": transcript, "step": step});
        let action = brain.0.think(&context).await.map_err(|e| EngineError::NodeFailed {
            node_id: node.id,
            error: e,
        })?;

        match action {
            AgentAction::Done { output } => {
                last_output = output;
                transcript.push(json!({"done": last_output}));
                break;
            }
            AgentAction::Tool { tool, inputs } => {
                if !tools.contains(&tool) {
                    return Err(EngineError::NodeFailed {
                        node_id: node.id,
                        error: format!("agent attempted unauthorized tool `{tool}`"),
                    });
                }
                let action_ctx =
                    ActionContext::new(ctx.execution_id, node.id, ctx.workflow_id, ScopeLevel::Global)
                        .with_cancellation(ctx.cancel.child_token());
                let result = ctx
                    .runtime
                    .execute_action(&tool, inputs, action_ctx)
                    .await
                    .map_err(EngineError::Runtime)?;
                last_output = super::extract_output(&result);
                transcript.push(json!({"tool": tool, "output": last_output}));
            }
        }
    }

    Ok(ActionResult::success(json!({
        "output": last_output,
        "steps": transcript,
    })))
}
