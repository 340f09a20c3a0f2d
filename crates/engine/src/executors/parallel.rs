//! `parallel` node dispatch: run each branch concurrently, join outputs.

use futures::future::try_join_all;
use nebula_action::result::ActionResult;
use nebula_workflow::{NodeDefinition, NodeKind};

use super::{ExecutorCtx, run_sequence};
use crate::error::EngineError;

pub(super) async fn execute(
    node: &NodeDefinition,
    input: serde_json::Value,
    ctx: &ExecutorCtx,
) -> Result<ActionResult<serde_json::Value>, EngineError> {
    let NodeKind::Parallel { branches } = &node.kind else {
        unreachable!("dispatch only routes Parallel nodes here");
    };

    let runs = branches.iter().map(|branch| {
        let input = input.clone();
        async move {
            let nested = ctx.nested()?;
            run_sequence(branch, input, &nested).await
        }
    });

    let outputs = try_join_all(runs).await?;
    let main_output = outputs.first().cloned();

    let ports = outputs
        .into_iter()
        .enumerate()
        .map(|(i, out)| (format!("branch_{i}"), out))
        .collect();

    Ok(ActionResult::MultiOutput {
        outputs: ports,
        main_output,
    })
}
