//! `code` node dispatch: run a sandboxed snippet via the injected
//! [`SandboxRunner`](nebula_ports::SandboxRunner), denying network access
//! by default (spec.md §4.8).

use nebula_action::context::ActionContext;
use nebula_action::metadata::ActionMetadata;
use nebula_action::result::ActionResult;
use nebula_action::sandbox::SandboxedContext;
use nebula_core::scope::ScopeLevel;
use nebula_workflow::{NodeDefinition, NodeKind};
use serde_json::json;

use super::ExecutorCtx;
use crate::error::EngineError;

pub(super) async fn execute(
    node: &NodeDefinition,
    input: serde_json::Value,
    ctx: &ExecutorCtx,
) -> Result<ActionResult<serde_json::Value>, EngineError> {
    let NodeKind::Code { language, source, params } = &node.kind else {
        unreachable!("dispatch only routes Code nodes here");
    };

    let sandbox = ctx
        .sandbox
        .as_ref()
        .ok_or(EngineError::SandboxNotConfigured { node_id: node.id })?;

    let resolved = ctx
        .resolver
        .resolve(node.id, params, &input, ctx.outputs)?
        .unwrap_or(input);

    let metadata = ActionMetadata::new(format!("code.{language}"), "Sandboxed code", "user-supplied snippet")
        .with_isolation(nebula_action::capability::IsolationLevel::Isolated);

    let action_ctx = ActionContext::new(ctx.execution_id, node.id, ctx.workflow_id, ScopeLevel::Global)
        .with_cancellation(ctx.cancel.child_token());
    let sandboxed_ctx = SandboxedContext::new(action_ctx, Vec::new());

    let snippet_input = json!({ "source": source, "input": resolved });

    sandbox
        .execute(sandboxed_ctx, &metadata, snippet_input)
        .await
        .map_err(|e| EngineError::NodeFailed {
            node_id: node.id,
            error: e.to_string(),
        })
}
