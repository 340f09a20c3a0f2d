//! `workflow` node dispatch: invoke a registered sub-workflow, scheduling
//! its own DAG level-by-level the same way the top-level engine does,
//! joining on its exit nodes for the output this node returns.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use nebula_action::result::ActionResult;
use nebula_core::id::NodeId;
use nebula_workflow::{DependencyGraph, NodeDefinition, NodeKind, RegistrySpace, WorkflowDefinition};
use serde_json::Value;

use super::ExecutorCtx;
use crate::error::EngineError;

/// Concrete, downcastable handle for a registered sub-[`WorkflowDefinition`].
pub struct WorkflowDefinitionHandle(pub Arc<WorkflowDefinition>);

pub(super) async fn execute(
    node: &NodeDefinition,
    input: Value,
    ctx: &ExecutorCtx,
) -> Result<ActionResult<Value>, EngineError> {
    let NodeKind::Workflow {
        workflow_id,
        input_mapping,
    } = &node.kind
    else {
        unreachable!("dispatch only routes Workflow nodes here");
    };

    let registry = ctx
        .registry
        .as_ref()
        .ok_or(EngineError::ProviderNotConfigured { node_id: node.id })?;

    let handle = registry
        .resolve(RegistrySpace::Workflow, &workflow_id.to_string())
        .map_err(|e| EngineError::NodeFailed {
            node_id: node.id,
            error: e.to_string(),
        })?
        .downcast::<WorkflowDefinitionHandle>()
        .map_err(|_| EngineError::NodeFailed {
            node_id: node.id,
            error: format!("`{workflow_id}` is not a registered sub-workflow handle"),
        })?;

    let resolved_input = ctx
        .resolver
        .resolve(node.id, input_mapping, &input, ctx.outputs)?
        .unwrap_or(input);

    let (plan, graph) = super::sub_levels(&handle.0)?;
    let sub_node_map: HashMap<NodeId, Arc<NodeDefinition>> = handle
        .0
        .nodes
        .iter()
        .cloned()
        .map(|n| (n.id, Arc::new(n)))
        .collect();

    for group in &plan.parallel_groups {
        if ctx.cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let tasks = group.iter().filter_map(|&id| {
            let sub_node = sub_node_map.get(&id).cloned()?;
            let node_input = resolve_sub_input(id, &graph, &ctx.outputs, &resolved_input);
            Some(async move {
                let nested = ctx.nested()?;
                let result = super::dispatch(sub_node, node_input, nested).await?;
                let out = super::extract_output(&result);
                ctx.outputs.insert(id, out);
                Ok::<(), EngineError>(())
            })
        });

        try_join_all(tasks).await?;
    }

    let exit = &plan.exit_nodes;
    let output = if exit.len() == 1 {
        ctx.outputs.get(&exit[0]).map(|v| v.value().clone()).unwrap_or(Value::Null)
    } else {
        let mut merged = serde_json::Map::new();
        for id in exit {
            if let Some(v) = ctx.outputs.get(id) {
                merged.insert(id.to_string(), v.value().clone());
            }
        }
        Value::Object(merged)
    };

    Ok(ActionResult::success(output))
}

/// Mirrors `engine::resolve_node_input` for a sub-workflow's own graph,
/// seeding entry nodes from `seed` rather than the top-level input.
fn resolve_sub_input(
    node_id: NodeId,
    graph: &DependencyGraph,
    outputs: &dashmap::DashMap<NodeId, Value>,
    seed: &Value,
) -> Value {
    let predecessors = graph.predecessors(node_id);
    if predecessors.is_empty() {
        return seed.clone();
    }
    if predecessors.len() == 1 {
        return outputs
            .get(&predecessors[0])
            .map(|v| v.value().clone())
            .unwrap_or(Value::Null);
    }
    let mut merged = serde_json::Map::new();
    for pred_id in &predecessors {
        if let Some(output) = outputs.get(pred_id) {
            merged.insert(pred_id.to_string(), output.value().clone());
        }
    }
    Value::Object(merged)
}
