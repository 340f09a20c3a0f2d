//! `tool` node dispatch: resolve params, call the mapped
//! [`ActionRuntime`](nebula_runtime::ActionRuntime) action directly.

use nebula_action::context::ActionContext;
use nebula_action::result::ActionResult;
use nebula_core::scope::ScopeLevel;
use nebula_workflow::{NodeDefinition, NodeKind};

use super::ExecutorCtx;
use crate::error::EngineError;

pub(super) async fn execute(
    node: &NodeDefinition,
    input: serde_json::Value,
    ctx: &ExecutorCtx,
) -> Result<ActionResult<serde_json::Value>, EngineError> {
    let NodeKind::Tool { action_id, params } = &node.kind else {
        unreachable!("dispatch only routes Tool nodes here");
    };

    let action_key = ctx
        .action_keys
        .get(action_id)
        .ok_or(EngineError::ActionKeyNotFound {
            action_id: *action_id,
        })?
        .clone();

    let resolved = ctx
        .resolver
        .resolve(node.id, params, &input, ctx.outputs)?
        .unwrap_or(input);

    let action_ctx = ActionContext::new(ctx.execution_id, node.id, ctx.workflow_id, ScopeLevel::Global)
        .with_cancellation(ctx.cancel.child_token());

    ctx.runtime
        .execute_action(&action_key, resolved, action_ctx)
        .await
        .map_err(EngineError::Runtime)
}
