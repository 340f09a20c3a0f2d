//! Start/status operations for workflow runs — the in-process equivalent
//! of the out-of-scope HTTP surface's `POST /executions` / `GET
//! /executions/{id}`.

use std::sync::Arc;

use nebula_action::ExecutionBudget;
use nebula_core::id::ExecutionId;
use nebula_engine::WorkflowEngine;
use nebula_ports::ExecutionRepo;
use nebula_workflow::WorkflowDefinition;
use serde_json::json;

use crate::error::ApiError;

/// Wraps a [`WorkflowEngine`] with an [`ExecutionRepo`] so a caller gets
/// back a handle it can later poll, instead of only the awaited result.
///
/// `start` runs the workflow to completion before returning — the engine
/// has no way to accept a caller-supplied execution id or external
/// cancellation token, so a true fire-and-forget "start now, poll later,
/// cancel mid-flight" surface would need that threaded through first (see
/// the memory subsystem's design notes for a similar gap.) `status` still
/// reads back from the repo, useful for auditing a run or building an
/// `inspect` command against its node outputs.
pub struct ExecutionService {
    engine: Arc<WorkflowEngine>,
    repo: Arc<dyn ExecutionRepo>,
}

impl ExecutionService {
    /// Wire an engine and execution-state backend together.
    #[must_use]
    pub fn new(engine: Arc<WorkflowEngine>, repo: Arc<dyn ExecutionRepo>) -> Self {
        Self { engine, repo }
    }

    /// Run `workflow` to completion and persist its outcome.
    ///
    /// Returns the execution id the engine generated internally — use it
    /// with [`Self::status`] to re-read the same record.
    pub async fn start(
        &self,
        workflow: &WorkflowDefinition,
        input: serde_json::Value,
        budget: ExecutionBudget,
    ) -> Result<ExecutionId, ApiError> {
        let result = self.engine.execute_workflow(workflow, input, budget).await?;
        let execution_id = result.execution_id;
        tracing::debug!(%execution_id, status = ?result.status, "execution finished");
        let state = json!({
            "status": result.status,
            "success": result.is_success(),
            "duration_ms": result.duration.as_millis() as u64,
            "node_outputs": result
                .node_outputs
                .iter()
                .map(|(id, v)| (id.to_string(), v.clone()))
                .collect::<serde_json::Map<_, _>>(),
        });

        self.repo.transition(execution_id, 0, state).await?;
        Ok(execution_id)
    }

    /// Read back the persisted outcome of a previously started execution.
    pub async fn status(&self, id: ExecutionId) -> Result<serde_json::Value, ApiError> {
        self.repo
            .get_state(id)
            .await?
            .map(|(_, state)| state)
            .ok_or(ApiError::ExecutionNotFound(id))
    }
}
