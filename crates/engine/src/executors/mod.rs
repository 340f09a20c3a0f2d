//! Per-kind node executors (spec component C7).
//!
//! Every [`NodeKind`] dispatches through [`dispatch`], including `tool`
//! nodes — the top-level scheduler in [`crate::engine`] no longer special-
//! cases the action-key path, it just builds one [`ExecutorCtx`] per
//! execution and calls [`dispatch`] for each scheduled node.
//!
//! All kinds converge on the same [`ActionResult<Value>`] the runtime
//! already returns for `tool` nodes — this engine has exactly one
//! per-node result contract, not two; kind-specific detail (token usage,
//! approval state, iteration count) is folded into the JSON output rather
//! than carried in a parallel result type.
//!
//! [`ExecutorCtx`] owns (via `Arc`) everything it shares rather than
//! borrowing it, so [`dispatch`]'s future is `'static` and can cross a
//! `tokio::task::JoinSet::spawn` boundary the same way the engine's
//! tool-only `NodeTask` always could.

mod agent;
mod code;
mod condition;
mod human;
mod llm;
mod loop_node;
mod monitor;
mod parallel;
mod tool;
mod workflow_node;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use dashmap::DashMap;
use futures::future::BoxFuture;
use nebula_action::ExecutionBudget;
use nebula_action::result::ActionResult;
use nebula_core::id::{ActionId, ExecutionId, NodeId, WorkflowId};
use nebula_execution::plan::ExecutionPlan;
use nebula_expression::ExpressionEngine;
use nebula_runtime::ActionRuntime;
use nebula_telemetry::event::{EventBus, ExecutionEvent};
use nebula_workflow::{DependencyGraph, NodeDefinition, NodeKind, Registry};
use tokio_util::sync::CancellationToken;

pub use agent::AgentBrainHandle;
pub use llm::LlmProviderHandle;
pub use workflow_node::WorkflowDefinitionHandle;

use crate::error::EngineError;
use crate::resolver::ParamResolver;

/// Shared context every kind executor needs, cheap to clone (every field
/// is an `Arc`, a `Copy` id, or otherwise designed to be cloned —
/// [`CancellationToken`] included).
#[derive(Clone)]
pub(crate) struct ExecutorCtx {
    pub runtime: Arc<ActionRuntime>,
    pub registry: Option<Arc<Registry>>,
    pub sandbox: Option<Arc<dyn nebula_ports::SandboxRunner>>,
    pub resolver: Arc<ParamResolver>,
    pub expression_engine: Arc<ExpressionEngine>,
    /// Every node in the workflow, including those only reachable via a
    /// `loop`/`parallel` body — see `crate::engine::embedded_node_ids`,
    /// which the top-level scheduler uses to avoid double-running them.
    pub node_map: Arc<HashMap<NodeId, Arc<NodeDefinition>>>,
    pub action_keys: Arc<HashMap<ActionId, String>>,
    pub outputs: Arc<DashMap<NodeId, serde_json::Value>>,
    pub cancel: CancellationToken,
    /// Shared with the top-level scheduler so cache/skip bookkeeping
    /// (outside any single node's own dispatch) can still emit events.
    pub event_bus: Arc<EventBus>,
    pub execution_id: ExecutionId,
    pub workflow_id: WorkflowId,
    pub budget: ExecutionBudget,
    pub tokens_used: Arc<AtomicU64>,
    pub depth: u32,
}

impl ExecutorCtx {
    /// This context, one recursion level deeper; errors if that exceeds
    /// `budget.max_depth`.
    pub(crate) fn nested(&self) -> Result<Self, EngineError> {
        let depth = self.depth + 1;
        if let Some(max) = self.budget.max_depth {
            if depth > max {
                return Err(EngineError::DepthExceeded { max });
            }
        }
        let mut next = self.clone();
        next.depth = depth;
        Ok(next)
    }

    /// Record `tokens` against the running total, failing if it would
    /// cross `budget.max_total_tokens`.
    pub(crate) fn charge_tokens(&self, tokens: u64) -> Result<(), EngineError> {
        use std::sync::atomic::Ordering;
        let total = self.tokens_used.fetch_add(tokens, Ordering::Relaxed) + tokens;
        if let Some(max) = self.budget.max_total_tokens {
            if total > max {
                return Err(EngineError::BudgetExceeded(format!(
                    "max_total_tokens exceeded: {total} > {max}"
                )));
            }
        }
        Ok(())
    }

    fn node(&self, id: NodeId) -> Result<Arc<NodeDefinition>, EngineError> {
        self.node_map
            .get(&id)
            .cloned()
            .ok_or(EngineError::NodeNotFound { node_id: id })
    }
}

/// Run one node to completion, dispatching on its [`NodeKind`].
///
/// Returns a `'static` [`BoxFuture`] so the top-level scheduler can
/// `tokio::task::JoinSet::spawn` it directly, and so `loop`/`parallel`/
/// `workflow` executors can recurse into this same function for their
/// body nodes without the compiler needing an infinitely-sized future
/// type.
///
/// Every kind but `tool` gets its `NodeStarted`/`NodeCompleted`/
/// `NodeFailed` lifecycle events emitted right here, uniformly, around the
/// per-kind executor call. `tool` is exempted because
/// [`ActionRuntime::execute_action`] already brackets its own action call
/// with the same three events (and an `agent` node's think/act loop calls
/// it per tool-use step too) — wrapping it again here would double-emit
/// for every tool node.
pub(crate) fn dispatch(
    node: Arc<NodeDefinition>,
    input: serde_json::Value,
    ctx: ExecutorCtx,
) -> BoxFuture<'static, Result<ActionResult<serde_json::Value>, EngineError>> {
    Box::pin(async move {
        if ctx.cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        if matches!(node.kind, NodeKind::Tool { .. }) {
            return tool::execute(&node, input, &ctx).await;
        }

        let execution_id = ctx.execution_id.to_string();
        let node_id = node.id.to_string();
        ctx.event_bus.emit(ExecutionEvent::NodeStarted {
            execution_id: execution_id.clone(),
            node_id: node_id.clone(),
        });
        let started = std::time::Instant::now();

        let result = match &node.kind {
            NodeKind::Llm { .. } => llm::execute(&node, input, &ctx).await,
            NodeKind::Condition { .. } => condition::execute(&node, input, &ctx).await,
            NodeKind::Code { .. } => code::execute(&node, input, &ctx).await,
            NodeKind::Agent { .. } => agent::execute(&node, input, &ctx).await,
            NodeKind::Human { .. } => human::execute(&node, input, &ctx).await,
            NodeKind::Monitor { .. } => monitor::execute(&node, input, &ctx).await,
            NodeKind::Loop { .. } => loop_node::execute(&node, input, &ctx).await,
            NodeKind::Parallel { .. } => parallel::execute(&node, input, &ctx).await,
            NodeKind::Workflow { .. } => workflow_node::execute(&node, input, &ctx).await,
            NodeKind::Tool { .. } => unreachable!("handled above"),
        };

        match &result {
            Ok(_) => ctx.event_bus.emit(ExecutionEvent::NodeCompleted {
                execution_id,
                node_id,
                duration: started.elapsed(),
            }),
            Err(err) => ctx.event_bus.emit(ExecutionEvent::NodeFailed {
                execution_id,
                node_id,
                error: err.to_string(),
            }),
        }

        result
    })
}

/// Run a list of node IDs (a `loop` body or one `parallel` branch) in
/// sequence, each receiving the prior node's output (the first receives
/// `seed`). Returns the last node's output.
pub(crate) async fn run_sequence(
    ids: &[NodeId],
    seed: serde_json::Value,
    ctx: &ExecutorCtx,
) -> Result<serde_json::Value, EngineError> {
    let mut current = seed;
    for &id in ids {
        let node = ctx.node(id)?;
        let nested = ctx.nested()?;
        let result = dispatch(node, current, nested).await?;
        current = extract_output(&result);
        ctx.outputs.insert(id, current.clone());
    }
    Ok(current)
}

/// Build a `(level_plan, graph)` pair for a node-id subset so recursive
/// executors can reuse the same level-based scheduling the top-level
/// engine uses, without re-deriving it by hand.
pub(crate) fn sub_levels(
    workflow: &nebula_workflow::WorkflowDefinition,
) -> Result<(ExecutionPlan, DependencyGraph), EngineError> {
    let plan = ExecutionPlan::from_workflow(ExecutionId::v4(), workflow, ExecutionBudget::default())
        .map_err(|e| EngineError::PlanningFailed(e.to_string()))?;
    let graph =
        DependencyGraph::from_definition(workflow).map_err(|e| EngineError::PlanningFailed(e.to_string()))?;
    Ok((plan, graph))
}

/// Extract the value downstream nodes should see from an [`ActionResult`].
/// Mirrors `engine::extract_primary_output`, duplicated here (rather than
/// exposed `pub(crate)` across modules) since the two call sites evolve
/// independently: this one feeds recursive executor input chaining, the
/// other feeds the top-level `outputs` map.
pub(crate) fn extract_output(result: &ActionResult<serde_json::Value>) -> serde_json::Value {
    match result {
        ActionResult::Success { output } => output.clone(),
        ActionResult::Skip { output, .. } => output.clone().unwrap_or(serde_json::Value::Null),
        ActionResult::Continue { output, .. } => output.clone(),
        ActionResult::Break { output, .. } => output.clone(),
        ActionResult::Branch { output, .. } => output.clone(),
        ActionResult::Route { data, .. } => data.clone(),
        ActionResult::MultiOutput { main_output, .. } => {
            main_output.clone().unwrap_or(serde_json::Value::Null)
        }
        ActionResult::Wait { partial_output, .. } => {
            partial_output.clone().unwrap_or(serde_json::Value::Null)
        }
    }
}
