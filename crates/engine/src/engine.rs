//! Workflow execution engine.
//!
//! Executes workflows by processing parallel groups level-by-level,
//! resolving inputs from predecessor outputs, and delegating action
//! execution to the runtime.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use nebula_action::ExecutionBudget;
use nebula_action::handler::InternalHandler;
use nebula_action::result::ActionResult;
use nebula_core::id::{ActionId, ExecutionId, NodeId, WorkflowId};
use nebula_execution::ExecutionStatus;
use nebula_execution::plan::ExecutionPlan;
use nebula_execution::state::ExecutionState;
use nebula_expression::ExpressionEngine;
use nebula_runtime::ActionRuntime;
use nebula_telemetry::event::{EventBus, ExecutionEvent};
use nebula_telemetry::metrics::MetricsRegistry;
use nebula_workflow::{
    DependencyGraph, FailurePolicy, NodeDefinition, NodeKind, NodeState, Registry, WorkflowDefinition,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::cache::NodeCache;
use crate::error::EngineError;
use crate::executors::{self, ExecutorCtx};
use crate::resolver::ParamResolver;
use crate::result::ExecutionResult;

/// Entries the node cache retains before moka starts evicting LRU-style.
const NODE_CACHE_CAPACITY: u64 = 10_000;

/// The workflow execution engine.
///
/// Orchestrates end-to-end execution of workflow definitions by:
///
/// 1. Building an execution plan (parallel groups from the DAG)
/// 2. Executing nodes level-by-level with bounded concurrency
/// 3. Resolving each node's input from predecessor outputs
/// 4. Delegating action execution to the [`ActionRuntime`]
/// 5. Tracking execution state and emitting telemetry
pub struct WorkflowEngine {
    runtime: Arc<ActionRuntime>,
    event_bus: Arc<EventBus>,
    metrics: Arc<MetricsRegistry>,
    /// Maps action IDs (from node definitions) to registry keys.
    action_keys: HashMap<ActionId, String>,
    /// C1 registry for `llm`/`agent`/`code`/`workflow` node lookups.
    /// `None` means those kinds fail with [`EngineError::ProviderNotConfigured`].
    registry: Option<Arc<Registry>>,
    /// Sandbox runner for `code` nodes. `None` means they fail with
    /// [`EngineError::SandboxNotConfigured`].
    sandbox: Option<Arc<dyn nebula_ports::SandboxRunner>>,
    /// Shared expression engine for `condition`/`monitor`/`loop` conditions
    /// and `ParamValue::Expression`/`Template` resolution.
    expression_engine: Arc<ExpressionEngine>,
    /// Deterministic-action result cache, keyed by node + resolved input.
    node_cache: Arc<NodeCache>,
}

impl WorkflowEngine {
    /// Create a new engine with the given components.
    pub fn new(
        runtime: Arc<ActionRuntime>,
        event_bus: Arc<EventBus>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            runtime,
            event_bus,
            metrics,
            action_keys: HashMap::new(),
            registry: None,
            sandbox: None,
            expression_engine: Arc::new(ExpressionEngine::new()),
            node_cache: Arc::new(NodeCache::new(NODE_CACHE_CAPACITY)),
        }
    }

    /// Attach a C1 registry so `llm`/`agent`/`code`/`workflow` nodes can
    /// resolve their provider/brain/sub-workflow handles.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Attach a sandbox runner so `code` nodes can execute.
    #[must_use]
    pub fn with_sandbox(mut self, sandbox: Arc<dyn nebula_ports::SandboxRunner>) -> Self {
        self.sandbox = Some(sandbox);
        self
    }

    /// Register a mapping from an action ID to a registry key.
    ///
    /// The engine uses this to look up the correct handler in the
    /// runtime's action registry when executing a node.
    pub fn map_action(&mut self, action_id: ActionId, key: impl Into<String>) {
        self.action_keys.insert(action_id, key.into());
    }

    /// Resolve the action registry key for a given action ID.
    fn resolve_action_key(&self, action_id: ActionId) -> Result<&str, EngineError> {
        self.action_keys
            .get(&action_id)
            .map(String::as_str)
            .ok_or(EngineError::ActionKeyNotFound { action_id })
    }

    /// Execute a workflow from start to finish.
    ///
    /// Builds an execution plan, then processes parallel groups
    /// level-by-level. Within each level, nodes execute concurrently
    /// up to `budget.max_concurrent_nodes`.
    ///
    /// Entry nodes receive the workflow-level `input`. Subsequent nodes
    /// receive the output of their predecessors.
    pub async fn execute_workflow(
        &self,
        workflow: &WorkflowDefinition,
        input: serde_json::Value,
        budget: ExecutionBudget,
    ) -> Result<ExecutionResult, EngineError> {
        let execution_id = ExecutionId::v4();
        let started = Instant::now();

        // 1. Build execution plan
        let plan = ExecutionPlan::from_workflow(execution_id, workflow, budget.clone())
            .map_err(|e| EngineError::PlanningFailed(e.to_string()))?;

        // 2. Build dependency graph for predecessor lookup
        let graph = DependencyGraph::from_definition(workflow)
            .map_err(|e| EngineError::PlanningFailed(e.to_string()))?;

        // 3. Validate action key mappings exist for all tool nodes. Other
        // kinds resolve their registry lookups lazily inside their own
        // executor (and are checked at compile time by the workflow
        // compiler's registry-resolution phase).
        for node in &workflow.nodes {
            if let Some(action_id) = node.action_id() {
                self.resolve_action_key(action_id)?;
            }
        }

        // 4. Initialize execution state
        let node_ids: Vec<NodeId> = workflow.nodes.iter().map(|n| n.id).collect();
        let mut exec_state = ExecutionState::new(execution_id, workflow.id, &node_ids);
        exec_state.transition_status(ExecutionStatus::Running)?;

        // 5. Create cancellation token
        let cancel_token = CancellationToken::new();

        // 6. Emit start event
        self.event_bus.emit(ExecutionEvent::Started {
            execution_id: execution_id.to_string(),
            workflow_id: workflow.id.to_string(),
        });
        self.metrics.counter("executions_started_total").inc();

        // 7. Build the node lookup map and node-kind executor context.
        // `node_map` covers every node, including ones only reachable via
        // a `loop`/`parallel` body — `embedded` marks those so the
        // top-level scheduler skips them (their owning node dispatches
        // them recursively instead).
        let node_map: Arc<HashMap<NodeId, Arc<NodeDefinition>>> = Arc::new(
            workflow
                .nodes
                .iter()
                .cloned()
                .map(|n| (n.id, Arc::new(n)))
                .collect(),
        );
        let embedded = embedded_node_ids(workflow);

        // 8. Shared output storage (concurrent access from worker tasks)
        let outputs: Arc<DashMap<NodeId, serde_json::Value>> = Arc::new(DashMap::new());
        let semaphore = Arc::new(Semaphore::new(budget.max_concurrent_nodes));

        let base_ctx = ExecutorCtx {
            runtime: self.runtime.clone(),
            registry: self.registry.clone(),
            sandbox: self.sandbox.clone(),
            resolver: Arc::new(ParamResolver::new(self.expression_engine.clone())),
            expression_engine: self.expression_engine.clone(),
            node_map,
            action_keys: Arc::new(self.action_keys.clone()),
            outputs: outputs.clone(),
            cancel: cancel_token.clone(),
            event_bus: self.event_bus.clone(),
            execution_id,
            workflow_id: workflow.id,
            budget: budget.clone(),
            tokens_used: Arc::new(AtomicU64::new(0)),
            depth: 0,
        };

        // 9. Execute level by level, bounded by the workflow's wall-time budget.
        let policy = workflow.config.failure_policy;
        let run = self.run_levels(
            &plan,
            &graph,
            &embedded,
            &outputs,
            &semaphore,
            &cancel_token,
            &mut exec_state,
            &input,
            &base_ctx,
            workflow.config.default_node_timeout,
            policy,
        );

        let (failures, skipped) = match tokio::time::timeout(budget.max_wall_time, run).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => {
                cancel_token.cancel();
                (
                    vec![(
                        NodeId::v4(),
                        EngineError::WorkflowTimeout {
                            limit_ms: budget.max_wall_time.as_millis() as u64,
                        }
                        .to_string(),
                    )],
                    HashSet::new(),
                )
            }
        };

        // Any node that never reached a terminal state - because its level
        // was never scheduled (HALT), it was downstream of a failure
        // (CONTINUE_POSSIBLE), or the wall-time budget tripped mid-run - is
        // marked skipped rather than left dangling as `Pending`/`Ready`.
        for node in &workflow.nodes {
            let Some(ns) = exec_state.node_states.get_mut(&node.id) else {
                continue;
            };
            if ns.state.is_terminal() {
                continue;
            }
            let _ = ns.transition_to(NodeState::Skipped);
            let reason = if skipped.contains(&node.id) {
                "upstream node failed".to_owned()
            } else {
                "execution did not reach this node".to_owned()
            };
            self.event_bus.emit(ExecutionEvent::NodeSkipped {
                execution_id: execution_id.to_string(),
                node_id: node.id.to_string(),
                reason,
            });
        }

        let elapsed = started.elapsed();

        // 10. Determine final status and emit events
        let failed_node = failures.first().cloned();
        let final_status = determine_final_status(&failures, &cancel_token);
        let _ = exec_state.transition_status(final_status);
        self.emit_final_event(execution_id, final_status, elapsed, &failed_node);

        // 11. Collect outputs
        let node_outputs: HashMap<NodeId, serde_json::Value> = outputs
            .iter()
            .map(|r| (*r.key(), r.value().clone()))
            .collect();

        Ok(ExecutionResult {
            execution_id,
            status: final_status,
            node_outputs,
            duration: elapsed,
        })
    }

    /// Execute all parallel groups level-by-level, honoring `policy` for
    /// how a node failure affects the rest of the run.
    ///
    /// Returns the failures encountered (`(node_id, message)`, in
    /// encounter order) and the set of node IDs skipped as a result of
    /// [`FailurePolicy::ContinuePossible`] cutting off a failed node's
    /// descendants.
    #[allow(clippy::too_many_arguments)]
    async fn run_levels(
        &self,
        plan: &ExecutionPlan,
        graph: &DependencyGraph,
        embedded: &HashSet<NodeId>,
        outputs: &Arc<DashMap<NodeId, serde_json::Value>>,
        semaphore: &Arc<Semaphore>,
        cancel_token: &CancellationToken,
        exec_state: &mut ExecutionState,
        input: &serde_json::Value,
        base_ctx: &ExecutorCtx,
        default_timeout: Duration,
        policy: FailurePolicy,
    ) -> (Vec<(NodeId, String)>, HashSet<NodeId>) {
        let mut failures = Vec::new();
        let mut skip_set: HashSet<NodeId> = HashSet::new();

        for group in &plan.parallel_groups {
            if cancel_token.is_cancelled() {
                break;
            }

            let mut join_set = spawn_level(
                group,
                embedded,
                &skip_set,
                graph,
                outputs,
                semaphore,
                exec_state,
                input,
                base_ctx,
                default_timeout,
                self.node_cache.clone(),
            );

            let level_failures =
                collect_level_results(&mut join_set, exec_state, cancel_token, policy).await;

            for (node_id, message) in level_failures {
                if matches!(policy, FailurePolicy::ContinuePossible) {
                    skip_set.extend(graph.descendants(node_id));
                }
                failures.push((node_id, message));
            }

            if matches!(policy, FailurePolicy::Halt) && !failures.is_empty() {
                break;
            }
        }

        (failures, skip_set)
    }

    /// Emit the final execution event and record metrics.
    fn emit_final_event(
        &self,
        execution_id: ExecutionId,
        status: ExecutionStatus,
        elapsed: std::time::Duration,
        failed_node: &Option<(NodeId, String)>,
    ) {
        match status {
            ExecutionStatus::Completed => {
                self.event_bus.emit(ExecutionEvent::Completed {
                    execution_id: execution_id.to_string(),
                    duration: elapsed,
                });
                self.metrics.counter("executions_completed_total").inc();
            }
            ExecutionStatus::Failed => {
                let error_msg = failed_node
                    .as_ref()
                    .map(|(_, e)| e.clone())
                    .unwrap_or_default();
                self.event_bus.emit(ExecutionEvent::Failed {
                    execution_id: execution_id.to_string(),
                    error: error_msg,
                });
                self.metrics.counter("executions_failed_total").inc();
            }
            ExecutionStatus::Cancelled => {
                self.event_bus.emit(ExecutionEvent::Cancelled {
                    execution_id: execution_id.to_string(),
                });
            }
            _ => {}
        }

        self.metrics
            .histogram("execution_duration_seconds")
            .observe(elapsed.as_secs_f64());
    }
}

/// Node IDs that only ever run embedded in a `loop`/`parallel` body — the
/// level-based scheduler must not schedule them directly, since their
/// owning node dispatches them recursively via [`executors::run_sequence`].
fn embedded_node_ids(workflow: &WorkflowDefinition) -> HashSet<NodeId> {
    let mut ids = HashSet::new();
    for node in &workflow.nodes {
        match &node.kind {
            NodeKind::Loop { body, .. } => ids.extend(body.iter().copied()),
            NodeKind::Parallel { branches } => {
                ids.extend(branches.iter().flatten().copied());
            }
            _ => {}
        }
    }
    ids
}

/// Spawn all nodes in a single level into a JoinSet.
#[allow(clippy::too_many_arguments)]
fn spawn_level(
    group: &[NodeId],
    embedded: &HashSet<NodeId>,
    skip_set: &HashSet<NodeId>,
    graph: &DependencyGraph,
    outputs: &Arc<DashMap<NodeId, serde_json::Value>>,
    semaphore: &Arc<Semaphore>,
    exec_state: &mut ExecutionState,
    input: &serde_json::Value,
    base_ctx: &ExecutorCtx,
    default_timeout: Duration,
    cache: Arc<NodeCache>,
) -> JoinSet<(NodeId, Result<ActionResult<serde_json::Value>, EngineError>)> {
    let mut join_set = JoinSet::new();

    for &node_id in group {
        if embedded.contains(&node_id) || skip_set.contains(&node_id) {
            continue;
        }
        let Some(node_def) = base_ctx.node_map.get(&node_id).cloned() else {
            continue;
        };
        let node_input = resolve_node_input(node_id, graph, outputs, input);

        // Mark node as running in execution state
        if let Some(ns) = exec_state.node_states.get_mut(&node_id) {
            let _ = ns.transition_to(NodeState::Ready);
            let _ = ns.transition_to(NodeState::Running);
        }

        let sem = semaphore.clone();
        let outputs_ref = outputs.clone();
        let ctx = base_ctx.clone();

        join_set.spawn(
            NodeTask {
                node: node_def,
                input: node_input,
                ctx,
                sem,
                outputs: outputs_ref,
                default_timeout,
                cache: cache.clone(),
            }
            .run(),
        );
    }

    join_set
}

/// Bundled parameters for a single node execution task.
struct NodeTask {
    node: Arc<NodeDefinition>,
    input: serde_json::Value,
    ctx: ExecutorCtx,
    sem: Arc<Semaphore>,
    outputs: Arc<DashMap<NodeId, serde_json::Value>>,
    default_timeout: Duration,
    cache: Arc<NodeCache>,
}

impl NodeTask {
    /// Execute this node: acquire semaphore, check cancellation, then
    /// cache/retry/timeout/schema-validate around the actual dispatch.
    async fn run(self) -> (NodeId, Result<ActionResult<serde_json::Value>, EngineError>) {
        let _permit = self.sem.acquire().await.expect("semaphore closed");

        if self.ctx.cancel.is_cancelled() {
            return (self.node.id, Err(EngineError::Cancelled));
        }

        let node_id = self.node.id;
        let result = run_node(
            self.node,
            self.input,
            self.ctx,
            self.default_timeout,
            self.cache,
        )
        .await;

        match result {
            Ok(action_result) => {
                // Extract the primary output for downstream node input resolution.
                if let Some(output) = extract_primary_output(&action_result) {
                    self.outputs.insert(node_id, output);
                }
                (node_id, Ok(action_result))
            }
            Err(e) => (node_id, Err(e)),
        }
    }
}

/// Whether a node's result is safe to cache and safe to serve from cache:
/// the node opts in via `use_cache`, and the action it runs is marked
/// [`nebula_action::metadata::ActionMetadata::is_deterministic`] (tool
/// nodes only - other kinds either never run the same way twice or
/// delegate to nested dispatch that caches at the leaf level instead).
fn node_is_cacheable(node: &NodeDefinition, ctx: &ExecutorCtx) -> bool {
    if !node.use_cache {
        return false;
    }
    match &node.kind {
        NodeKind::Tool { action_id, .. } => ctx
            .action_keys
            .get(action_id)
            .and_then(|key| ctx.runtime.registry().get(key).ok())
            .is_some_and(|handler| handler.metadata().is_deterministic),
        NodeKind::Condition { .. } | NodeKind::Code { .. } => true,
        NodeKind::Llm { .. }
        | NodeKind::Human { .. }
        | NodeKind::Monitor { .. }
        | NodeKind::Agent { .. }
        | NodeKind::Loop { .. }
        | NodeKind::Parallel { .. }
        | NodeKind::Workflow { .. } => false,
    }
}

/// Delay before retry attempt `attempt` (1-indexed): exponential backoff
/// off `base`, capped at 60s.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    base.saturating_mul(1u32 << exponent).min(Duration::from_secs(60))
}

/// Run a single node to completion: serve from cache if possible, dispatch
/// with a per-attempt timeout and exponential-backoff retries bounded by
/// `node.retry`, validate the output against `node.output_schema`, then
/// populate the cache on a cacheable success.
async fn run_node(
    node: Arc<NodeDefinition>,
    input: serde_json::Value,
    ctx: ExecutorCtx,
    default_timeout: Duration,
    cache: Arc<NodeCache>,
) -> Result<ActionResult<serde_json::Value>, EngineError> {
    let cacheable = node_is_cacheable(&node, &ctx);
    let fingerprint = cacheable.then(|| NodeCache::fingerprint(&node, &input));

    if let Some(fp) = &fingerprint {
        if let Some(cached_output) = cache.get(fp).await {
            ctx.event_bus.emit(ExecutionEvent::NodeCached {
                execution_id: ctx.execution_id.to_string(),
                node_id: node.id.to_string(),
            });
            return Ok(ActionResult::success(cached_output));
        }
    }

    let timeout = node.timeout.unwrap_or(default_timeout);
    // `node.retry` absent means the node opted out of retries entirely;
    // `max_attempts` on the policy counts retries, not tries, hence + 1.
    let total_attempts = node.retry.as_ref().map_or(1, |r| r.max_attempts + 1);
    let base_delay = node.retry.as_ref().map_or(Duration::ZERO, |r| r.base_delay);

    let mut attempt = 1;
    let action_result = loop {
        let dispatch = executors::dispatch(node.clone(), input.clone(), ctx.clone());
        let outcome = match tokio::time::timeout(timeout, dispatch).await {
            Ok(result) => result,
            Err(_elapsed) => Err(EngineError::NodeTimeout {
                node_id: node.id,
                elapsed_ms: timeout.as_millis() as u64,
            }),
        };

        match outcome {
            Ok(result) => break result,
            Err(err) if attempt < total_attempts && err.is_retriable() => {
                tokio::time::sleep(backoff_delay(base_delay, attempt)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    };

    if let Some(schema) = &node.output_schema {
        let output = executors::extract_output(&action_result);
        if let Err(errors) = schema.validate(&output) {
            return Err(EngineError::OutputSchemaViolation {
                node_id: node.id,
                errors,
            });
        }
    }

    if let Some(fp) = fingerprint {
        cache.put(fp, executors::extract_output(&action_result)).await;
    }

    Ok(action_result)
}

/// Collect results from a level's JoinSet and update execution state.
///
/// Under [`FailurePolicy::Halt`] the first failure cancels the token and
/// stops draining the rest of the level early; the other two policies
/// drain every task in the level and report every failure encountered.
async fn collect_level_results(
    join_set: &mut JoinSet<(NodeId, Result<ActionResult<serde_json::Value>, EngineError>)>,
    exec_state: &mut ExecutionState,
    cancel_token: &CancellationToken,
    policy: FailurePolicy,
) -> Vec<(NodeId, String)> {
    let mut failures = Vec::new();
    while let Some(join_result) = join_set.join_next().await {
        match join_result {
            Ok((node_id, Ok(_action_result))) => {
                mark_node_completed(exec_state, node_id);
            }
            Ok((node_id, Err(ref err))) => {
                mark_node_failed(exec_state, node_id, err);
                failures.push((node_id, err.to_string()));
                if matches!(policy, FailurePolicy::Halt) {
                    cancel_token.cancel();
                    break;
                }
            }
            Err(join_err) => {
                tracing::error!(?join_err, "node task panicked");
                failures.push((NodeId::v4(), join_err.to_string()));
                if matches!(policy, FailurePolicy::Halt) {
                    cancel_token.cancel();
                    break;
                }
            }
        }
    }
    failures
}

/// Mark a node as completed in the execution state.
fn mark_node_completed(exec_state: &mut ExecutionState, node_id: NodeId) {
    if let Some(ns) = exec_state.node_states.get_mut(&node_id) {
        let _ = ns.transition_to(NodeState::Completed);
    }
}

/// Mark a node as failed in the execution state.
fn mark_node_failed(exec_state: &mut ExecutionState, node_id: NodeId, err: &EngineError) {
    if let Some(ns) = exec_state.node_states.get_mut(&node_id) {
        let _ = ns.transition_to(NodeState::Failed);
        ns.error_message = Some(err.to_string());
    }
}

/// Determine the final execution status.
fn determine_final_status(
    failures: &[(NodeId, String)],
    cancel_token: &CancellationToken,
) -> ExecutionStatus {
    if !failures.is_empty() {
        ExecutionStatus::Failed
    } else if cancel_token.is_cancelled() {
        ExecutionStatus::Cancelled
    } else {
        ExecutionStatus::Completed
    }
}

/// Resolve the input for a node from its predecessors' outputs.
///
/// - Entry nodes (no predecessors): receive the workflow-level input.
/// - Single predecessor: receive that node's output directly.
/// - Multiple predecessors: receive a JSON object with each predecessor's
///   output keyed by its node ID.
fn resolve_node_input(
    node_id: NodeId,
    graph: &DependencyGraph,
    outputs: &DashMap<NodeId, serde_json::Value>,
    workflow_input: &serde_json::Value,
) -> serde_json::Value {
    let predecessors = graph.predecessors(node_id);
    if predecessors.is_empty() {
        return workflow_input.clone();
    }
    if predecessors.len() == 1 {
        return outputs
            .get(&predecessors[0])
            .map(|v| v.value().clone())
            .unwrap_or(serde_json::Value::Null);
    }
    let mut merged = serde_json::Map::new();
    for pred_id in &predecessors {
        if let Some(output) = outputs.get(pred_id) {
            merged.insert(pred_id.to_string(), output.value().clone());
        }
    }
    serde_json::Value::Object(merged)
}

/// Extract the primary output value from an ActionResult for downstream input resolution.
fn extract_primary_output(result: &ActionResult<serde_json::Value>) -> Option<serde_json::Value> {
    match result {
        ActionResult::Success { output } => Some(output.clone()),
        ActionResult::Skip { output, .. } => output.clone(),
        ActionResult::Continue { output, .. } => Some(output.clone()),
        ActionResult::Break { output, .. } => Some(output.clone()),
        ActionResult::Branch { output, .. } => Some(output.clone()),
        ActionResult::Route { data, .. } => Some(data.clone()),
        ActionResult::MultiOutput { main_output, .. } => main_output.clone(),
        ActionResult::Wait { partial_output, .. } => partial_output.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_action::ActionError;
    use nebula_action::ParameterCollection;
    use nebula_action::context::ActionContext;
    use nebula_action::capability::IsolationLevel;
    use nebula_action::handler::InternalHandler;
    use nebula_action::metadata::{ActionMetadata, ActionType};
    use nebula_action::result::ActionResult;
    use nebula_core::Version;
    use nebula_core::id::ActionId;
    use nebula_runtime::DataPassingPolicy;
    use nebula_runtime::registry::ActionRegistry;
    use nebula_sandbox_inprocess::{ActionExecutor, InProcessSandbox};
    use nebula_workflow::{Connection, NodeDefinition, WorkflowConfig, WorkflowDefinition};

    // -- Test handlers --

    struct EchoHandler {
        meta: ActionMetadata,
    }

    #[async_trait::async_trait]
    impl InternalHandler for EchoHandler {
        async fn execute(
            &self,
            input: serde_json::Value,
            _ctx: ActionContext,
        ) -> Result<ActionResult<serde_json::Value>, ActionError> {
            Ok(ActionResult::success(input))
        }
        fn metadata(&self) -> &ActionMetadata {
            &self.meta
        }
        fn action_type(&self) -> ActionType {
            ActionType::Process
        }
        fn parameters(&self) -> Option<&ParameterCollection> {
            None
        }
    }

    struct FailHandler {
        meta: ActionMetadata,
    }

    #[async_trait::async_trait]
    impl InternalHandler for FailHandler {
        async fn execute(
            &self,
            _input: serde_json::Value,
            _ctx: ActionContext,
        ) -> Result<ActionResult<serde_json::Value>, ActionError> {
            Err(ActionError::fatal("intentional failure"))
        }
        fn metadata(&self) -> &ActionMetadata {
            &self.meta
        }
        fn action_type(&self) -> ActionType {
            ActionType::Process
        }
        fn parameters(&self) -> Option<&ParameterCollection> {
            None
        }
    }

    /// Fails with a retryable error on its first `fails_before_success`
    /// calls, then succeeds, echoing the input. Lets retry tests assert on
    /// an exact call count without timing.
    struct FlakyHandler {
        meta: ActionMetadata,
        fails_before_success: u32,
        calls: std::sync::atomic::AtomicU32,
    }

    #[async_trait::async_trait]
    impl InternalHandler for FlakyHandler {
        async fn execute(
            &self,
            input: serde_json::Value,
            _ctx: ActionContext,
        ) -> Result<ActionResult<serde_json::Value>, ActionError> {
            let call = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if call < self.fails_before_success {
                Err(ActionError::retryable("not yet"))
            } else {
                Ok(ActionResult::success(input))
            }
        }
        fn metadata(&self) -> &ActionMetadata {
            &self.meta
        }
        fn action_type(&self) -> ActionType {
            ActionType::Process
        }
        fn parameters(&self) -> Option<&ParameterCollection> {
            None
        }
    }

    /// Counts invocations so cache-hit tests can assert the handler ran
    /// exactly once despite the workflow dispatching its node twice.
    struct CountingHandler {
        meta: ActionMetadata,
        calls: Arc<std::sync::atomic::AtomicU32>,
    }

    #[async_trait::async_trait]
    impl InternalHandler for CountingHandler {
        async fn execute(
            &self,
            input: serde_json::Value,
            _ctx: ActionContext,
        ) -> Result<ActionResult<serde_json::Value>, ActionError> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(ActionResult::success(input))
        }
        fn metadata(&self) -> &ActionMetadata {
            &self.meta
        }
        fn action_type(&self) -> ActionType {
            ActionType::Process
        }
        fn parameters(&self) -> Option<&ParameterCollection> {
            None
        }
    }

    // -- Helpers --

    fn make_workflow(
        nodes: Vec<NodeDefinition>,
        connections: Vec<Connection>,
    ) -> WorkflowDefinition {
        make_workflow_with_config(nodes, connections, WorkflowConfig::default())
    }

    fn make_workflow_with_config(
        nodes: Vec<NodeDefinition>,
        connections: Vec<Connection>,
        config: WorkflowConfig,
    ) -> WorkflowDefinition {
        let now = chrono::Utc::now();
        WorkflowDefinition {
            id: WorkflowId::v4(),
            name: "test".into(),
            description: None,
            version: Version::new(0, 1, 0),
            nodes,
            connections,
            variables: HashMap::new(),
            config,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn make_engine(
        registry: Arc<ActionRegistry>,
    ) -> (WorkflowEngine, Arc<EventBus>, Arc<MetricsRegistry>) {
        let executor: ActionExecutor = Arc::new(|_ctx, _meta, input| {
            Box::pin(async move { Ok(ActionResult::success(input)) })
        });
        let sandbox = Arc::new(InProcessSandbox::new(executor));
        let event_bus = Arc::new(EventBus::new(64));
        let metrics = Arc::new(MetricsRegistry::new());

        let runtime = Arc::new(ActionRuntime::new(
            registry,
            sandbox,
            DataPassingPolicy::default(),
            event_bus.clone(),
            metrics.clone(),
        ));

        let engine = WorkflowEngine::new(runtime, event_bus.clone(), metrics.clone());
        (engine, event_bus, metrics)
    }

    // -- Tests --

    #[tokio::test]
    async fn single_node_workflow() {
        let action_id = ActionId::v4();
        let registry = Arc::new(ActionRegistry::new());
        registry.register(Arc::new(EchoHandler {
            meta: ActionMetadata::new("echo", "Echo", "echoes input")
                .with_isolation(IsolationLevel::None),
        }));

        let (mut engine, _, _) = make_engine(registry);
        engine.map_action(action_id, "echo");

        let n = NodeId::v4();
        let wf = make_workflow(vec![NodeDefinition::new(n, "echo", action_id)], vec![]);

        let result = engine
            .execute_workflow(&wf, serde_json::json!("hello"), ExecutionBudget::default())
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.node_output(n), Some(&serde_json::json!("hello")));
    }

    #[tokio::test]
    async fn linear_two_node_workflow() {
        let echo_id = ActionId::v4();
        let registry = Arc::new(ActionRegistry::new());
        registry.register(Arc::new(EchoHandler {
            meta: ActionMetadata::new("echo", "Echo", "echoes input")
                .with_isolation(IsolationLevel::None),
        }));

        let (mut engine, _, _) = make_engine(registry);
        engine.map_action(echo_id, "echo");

        let n1 = NodeId::v4();
        let n2 = NodeId::v4();
        let wf = make_workflow(
            vec![
                NodeDefinition::new(n1, "A", echo_id),
                NodeDefinition::new(n2, "B", echo_id),
            ],
            vec![Connection::new(n1, n2)],
        );

        let result = engine
            .execute_workflow(&wf, serde_json::json!(42), ExecutionBudget::default())
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.node_output(n1), Some(&serde_json::json!(42)));
        // B echoes its input, which is A's output (42)
        assert_eq!(result.node_output(n2), Some(&serde_json::json!(42)));
    }

    #[tokio::test]
    async fn diamond_workflow() {
        let echo_id = ActionId::v4();
        let registry = Arc::new(ActionRegistry::new());
        registry.register(Arc::new(EchoHandler {
            meta: ActionMetadata::new("echo", "Echo", "echoes input")
                .with_isolation(IsolationLevel::None),
        }));

        let (mut engine, _, _) = make_engine(registry);
        engine.map_action(echo_id, "echo");

        let a = NodeId::v4();
        let b = NodeId::v4();
        let c = NodeId::v4();
        let d = NodeId::v4();
        let wf = make_workflow(
            vec![
                NodeDefinition::new(a, "A", echo_id),
                NodeDefinition::new(b, "B", echo_id),
                NodeDefinition::new(c, "C", echo_id),
                NodeDefinition::new(d, "D", echo_id),
            ],
            vec![
                Connection::new(a, b),
                Connection::new(a, c),
                Connection::new(b, d),
                Connection::new(c, d),
            ],
        );

        let result = engine
            .execute_workflow(&wf, serde_json::json!("start"), ExecutionBudget::default())
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.node_outputs.len(), 4);
        assert_eq!(result.node_output(a), Some(&serde_json::json!("start")));
        assert_eq!(result.node_output(b), Some(&serde_json::json!("start")));
        assert_eq!(result.node_output(c), Some(&serde_json::json!("start")));
        // Join node gets merged outputs from b and c
        let d_output = result.node_output(d).unwrap();
        assert!(d_output.is_object());
    }

    #[tokio::test]
    async fn failing_node_stops_execution() {
        let echo_id = ActionId::v4();
        let fail_id = ActionId::v4();
        let registry = Arc::new(ActionRegistry::new());
        registry.register(Arc::new(EchoHandler {
            meta: ActionMetadata::new("echo", "Echo", "echoes input")
                .with_isolation(IsolationLevel::None),
        }));
        registry.register(Arc::new(FailHandler {
            meta: ActionMetadata::new("fail", "Fail", "always fails")
                .with_isolation(IsolationLevel::None),
        }));

        let (mut engine, _, _) = make_engine(registry);
        engine.map_action(echo_id, "echo");
        engine.map_action(fail_id, "fail");

        let n1 = NodeId::v4();
        let n2 = NodeId::v4();
        let n3 = NodeId::v4();
        let wf = make_workflow(
            vec![
                NodeDefinition::new(n1, "A", echo_id),
                NodeDefinition::new(n2, "B", fail_id),
                NodeDefinition::new(n3, "C", echo_id),
            ],
            vec![Connection::new(n1, n2), Connection::new(n2, n3)],
        );

        let result = engine
            .execute_workflow(&wf, serde_json::json!("input"), ExecutionBudget::default())
            .await
            .unwrap();

        assert!(result.is_failure());
        assert!(result.node_output(n1).is_some());
        assert!(result.node_output(n2).is_none());
        assert!(result.node_output(n3).is_none());
    }

    #[tokio::test]
    async fn missing_action_key_returns_error() {
        let unknown_action = ActionId::v4();
        let registry = Arc::new(ActionRegistry::new());
        let (engine, _, _) = make_engine(registry);

        let n = NodeId::v4();
        let wf = make_workflow(vec![NodeDefinition::new(n, "A", unknown_action)], vec![]);

        let result = engine
            .execute_workflow(&wf, serde_json::json!(null), ExecutionBudget::default())
            .await;

        assert!(matches!(result, Err(EngineError::ActionKeyNotFound { .. })));
    }

    #[tokio::test]
    async fn empty_workflow_returns_planning_error() {
        let registry = Arc::new(ActionRegistry::new());
        let (engine, _, _) = make_engine(registry);

        let wf = make_workflow(vec![], vec![]);
        let result = engine
            .execute_workflow(&wf, serde_json::json!(null), ExecutionBudget::default())
            .await;

        assert!(matches!(result, Err(EngineError::PlanningFailed(_))));
    }

    #[tokio::test]
    async fn telemetry_events_emitted() {
        let echo_id = ActionId::v4();
        let registry = Arc::new(ActionRegistry::new());
        registry.register(Arc::new(EchoHandler {
            meta: ActionMetadata::new("echo", "Echo", "echoes input")
                .with_isolation(IsolationLevel::None),
        }));

        let (mut engine, event_bus, metrics) = make_engine(registry);
        engine.map_action(echo_id, "echo");

        let mut sub = event_bus.subscribe();

        let n = NodeId::v4();
        let wf = make_workflow(vec![NodeDefinition::new(n, "echo", echo_id)], vec![]);

        engine
            .execute_workflow(&wf, serde_json::json!("test"), ExecutionBudget::default())
            .await
            .unwrap();

        // Should have events from both engine (Started, Completed) and runtime
        let mut event_count = 0;
        while sub.try_recv().is_some() {
            event_count += 1;
        }
        assert!(event_count >= 3);

        assert!(metrics.counter("executions_started_total").get() > 0);
        assert!(metrics.counter("executions_completed_total").get() > 0);
    }

    #[tokio::test]
    async fn metrics_recorded_on_failure() {
        let fail_id = ActionId::v4();
        let registry = Arc::new(ActionRegistry::new());
        registry.register(Arc::new(FailHandler {
            meta: ActionMetadata::new("fail", "Fail", "always fails")
                .with_isolation(IsolationLevel::None),
        }));

        let (mut engine, _, metrics) = make_engine(registry);
        engine.map_action(fail_id, "fail");

        let n = NodeId::v4();
        let wf = make_workflow(vec![NodeDefinition::new(n, "fail", fail_id)], vec![]);

        let result = engine
            .execute_workflow(&wf, serde_json::json!(null), ExecutionBudget::default())
            .await
            .unwrap();

        assert!(result.is_failure());
        assert!(metrics.counter("executions_started_total").get() > 0);
        assert!(metrics.counter("executions_failed_total").get() > 0);
    }

    #[tokio::test]
    async fn retryable_failure_recovers_within_max_attempts() {
        use nebula_workflow::RetryPolicy;

        let flaky_id = ActionId::v4();
        let registry = Arc::new(ActionRegistry::new());
        registry.register(Arc::new(FlakyHandler {
            meta: ActionMetadata::new("flaky", "Flaky", "fails once then succeeds")
                .with_isolation(IsolationLevel::None),
            fails_before_success: 1,
            calls: std::sync::atomic::AtomicU32::new(0),
        }));

        let (mut engine, _, _) = make_engine(registry);
        engine.map_action(flaky_id, "flaky");

        let n = NodeId::v4();
        let node = NodeDefinition::new(n, "flaky", flaky_id).with_retry(RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
        });
        let wf = make_workflow(vec![node], vec![]);

        let result = engine
            .execute_workflow(&wf, serde_json::json!("ok"), ExecutionBudget::default())
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.node_output(n), Some(&serde_json::json!("ok")));
    }

    #[tokio::test]
    async fn cached_node_is_not_rerun_on_a_second_execution() {
        let action_id = ActionId::v4();
        let registry = Arc::new(ActionRegistry::new());
        let calls = Arc::new(std::sync::atomic::AtomicU32::new(0));
        registry.register(Arc::new(CountingHandler {
            meta: ActionMetadata::new("counted", "Counted", "counts its calls")
                .with_isolation(IsolationLevel::None),
            calls: calls.clone(),
        }));

        let (mut engine, event_bus, _) = make_engine(registry);
        engine.map_action(action_id, "counted");

        let n = NodeId::v4();
        let node = NodeDefinition::new(n, "counted", action_id).with_cache(true);
        let wf = make_workflow(vec![node], vec![]);

        let first = engine
            .execute_workflow(&wf, serde_json::json!("same-input"), ExecutionBudget::default())
            .await
            .unwrap();
        assert!(first.is_success());

        let mut sub = event_bus.subscribe();
        let second = engine
            .execute_workflow(&wf, serde_json::json!("same-input"), ExecutionBudget::default())
            .await
            .unwrap();
        assert!(second.is_success());
        assert_eq!(second.node_output(n), Some(&serde_json::json!("same-input")));

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);

        let mut saw_cached = false;
        while let Some(event) = sub.try_recv() {
            if matches!(event, ExecutionEvent::NodeCached { node_id, .. } if node_id == n.to_string()) {
                saw_cached = true;
            }
        }
        assert!(saw_cached);
    }

    #[tokio::test]
    async fn continue_possible_skips_only_the_failed_branch() {
        let echo_id = ActionId::v4();
        let fail_id = ActionId::v4();
        let registry = Arc::new(ActionRegistry::new());
        registry.register(Arc::new(EchoHandler {
            meta: ActionMetadata::new("echo", "Echo", "echoes input")
                .with_isolation(IsolationLevel::None),
        }));
        registry.register(Arc::new(FailHandler {
            meta: ActionMetadata::new("fail", "Fail", "always fails")
                .with_isolation(IsolationLevel::None),
        }));

        let (mut engine, _, _) = make_engine(registry);
        engine.map_action(echo_id, "echo");
        engine.map_action(fail_id, "fail");

        let a = NodeId::v4();
        let b = NodeId::v4();
        let c = NodeId::v4();
        let wf = make_workflow_with_config(
            vec![
                NodeDefinition::new(a, "A-fails", fail_id),
                NodeDefinition::new(b, "B-downstream-of-A", echo_id),
                NodeDefinition::new(c, "C-independent", echo_id),
            ],
            vec![Connection::new(a, b)],
            WorkflowConfig {
                failure_policy: FailurePolicy::ContinuePossible,
                ..WorkflowConfig::default()
            },
        );

        let result = engine
            .execute_workflow(&wf, serde_json::json!("input"), ExecutionBudget::default())
            .await
            .unwrap();

        assert!(result.is_failure());
        assert!(result.node_output(b).is_none());
        assert_eq!(result.node_output(c), Some(&serde_json::json!("input")));
    }

    #[tokio::test]
    async fn continue_all_runs_descendants_with_null_input() {
        let echo_id = ActionId::v4();
        let fail_id = ActionId::v4();
        let registry = Arc::new(ActionRegistry::new());
        registry.register(Arc::new(EchoHandler {
            meta: ActionMetadata::new("echo", "Echo", "echoes input")
                .with_isolation(IsolationLevel::None),
        }));
        registry.register(Arc::new(FailHandler {
            meta: ActionMetadata::new("fail", "Fail", "always fails")
                .with_isolation(IsolationLevel::None),
        }));

        let (mut engine, _, _) = make_engine(registry);
        engine.map_action(echo_id, "echo");
        engine.map_action(fail_id, "fail");

        let a = NodeId::v4();
        let b = NodeId::v4();
        let wf = make_workflow_with_config(
            vec![
                NodeDefinition::new(a, "A-fails", fail_id),
                NodeDefinition::new(b, "B-downstream-of-A", echo_id),
            ],
            vec![Connection::new(a, b)],
            WorkflowConfig {
                failure_policy: FailurePolicy::ContinueAll,
                ..WorkflowConfig::default()
            },
        );

        let result = engine
            .execute_workflow(&wf, serde_json::json!("input"), ExecutionBudget::default())
            .await
            .unwrap();

        assert!(result.is_failure());
        assert_eq!(result.node_output(b), Some(&serde_json::json!(null)));
    }

    #[tokio::test]
    async fn node_timeout_fails_the_node() {
        struct SlowHandler {
            meta: ActionMetadata,
        }

        #[async_trait::async_trait]
        impl InternalHandler for SlowHandler {
            async fn execute(
                &self,
                input: serde_json::Value,
                _ctx: ActionContext,
            ) -> Result<ActionResult<serde_json::Value>, ActionError> {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(ActionResult::success(input))
            }
            fn metadata(&self) -> &ActionMetadata {
                &self.meta
            }
            fn action_type(&self) -> ActionType {
                ActionType::Process
            }
            fn parameters(&self) -> Option<&ParameterCollection> {
                None
            }
        }

        let slow_id = ActionId::v4();
        let registry = Arc::new(ActionRegistry::new());
        registry.register(Arc::new(SlowHandler {
            meta: ActionMetadata::new("slow", "Slow", "sleeps past its timeout")
                .with_isolation(IsolationLevel::None),
        }));

        let (mut engine, event_bus, _) = make_engine(registry);
        engine.map_action(slow_id, "slow");

        let mut sub = event_bus.subscribe();

        let n = NodeId::v4();
        let node = NodeDefinition::new(n, "slow", slow_id).with_timeout(Duration::from_millis(20));
        let wf = make_workflow(vec![node], vec![]);

        let result = engine
            .execute_workflow(&wf, serde_json::json!(null), ExecutionBudget::default())
            .await
            .unwrap();

        assert!(result.is_failure());

        let mut saw_timeout = false;
        while let Some(event) = sub.try_recv() {
            if let ExecutionEvent::Failed { error, .. } = event {
                saw_timeout = error.contains("timed out");
            }
        }
        assert!(saw_timeout);
    }

    #[tokio::test]
    async fn non_tool_nodes_emit_node_lifecycle_events() {
        let registry = Arc::new(ActionRegistry::new());
        let (mut engine, event_bus, _) = make_engine(registry);

        let mut sub = event_bus.subscribe();

        let n = NodeId::v4();
        let node = NodeDefinition::with_kind(
            n,
            "always-true",
            NodeKind::Condition {
                expr: "true".into(),
            },
        );
        let wf = make_workflow(vec![node], vec![]);

        engine
            .execute_workflow(&wf, serde_json::json!(null), ExecutionBudget::default())
            .await
            .unwrap();

        let mut saw_node_started = false;
        let mut saw_node_completed = false;
        while let Some(event) = sub.try_recv() {
            match event {
                ExecutionEvent::NodeStarted { node_id, .. } if node_id == n.to_string() => {
                    saw_node_started = true;
                }
                ExecutionEvent::NodeCompleted { node_id, .. } if node_id == n.to_string() => {
                    saw_node_completed = true;
                }
                _ => {}
            }
        }
        assert!(saw_node_started, "condition node should emit NodeStarted");
        assert!(saw_node_completed, "condition node should emit NodeCompleted");
    }
}
