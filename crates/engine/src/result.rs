//! Execution result types.

use std::collections::HashMap;
use std::time::Duration;

use nebula_core::id::{ExecutionId, NodeId};
use nebula_execution::ExecutionStatus;

/// The final result of a workflow execution.
#[derive(Debug)]
pub struct ExecutionResult {
    /// Unique execution identifier.
    pub execution_id: ExecutionId,
    /// Final execution status.
    pub status: ExecutionStatus,
    /// Per-node output values (only for successfully completed nodes).
    pub node_outputs: HashMap<NodeId, serde_json::Value>,
    /// Wall-clock duration of the execution.
    pub duration: Duration,
}

impl ExecutionResult {
    /// Whether the execution completed successfully.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Whether the execution failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }

    /// Get a specific node's output.
    #[must_use]
    pub fn node_output(&self, node_id: NodeId) -> Option<&serde_json::Value> {
        self.node_outputs.get(&node_id)
    }
}
