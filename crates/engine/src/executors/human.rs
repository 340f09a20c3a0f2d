//! `human` node dispatch: pause for approval.
//!
//! This engine has no out-of-process resume channel (no webhook/event bus
//! wired up), so a `human` node always returns [`ActionResult::Wait`] with a
//! [`WaitCondition::Approval`] — the caller observes the execution parked
//! and resumes it through whatever external mechanism drives approvals,
//! rather than this engine polling for one.

use nebula_action::result::{ActionResult, WaitCondition};
use nebula_workflow::{NodeDefinition, NodeKind};

use super::ExecutorCtx;
use crate::error::EngineError;

pub(super) async fn execute(
    node: &NodeDefinition,
    input: serde_json::Value,
    _ctx: &ExecutorCtx,
) -> Result<ActionResult<serde_json::Value>, EngineError> {
    let NodeKind::Human { approval } = &node.kind else {
        unreachable!("dispatch only routes Human nodes here");
    };

    let approver = approval
        .approvers
        .first()
        .cloned()
        .unwrap_or_else(|| "any".to_owned());

    Ok(ActionResult::Wait {
        condition: WaitCondition::Approval {
            approver,
            message: approval.prompt.clone(),
        },
        timeout: approval.timeout,
        partial_output: Some(input),
    })
}
