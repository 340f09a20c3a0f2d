//! Engine error types.

use nebula_core::id::{ActionId, NodeId};

/// Errors from the engine layer.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No action key mapping for the given action ID.
    #[error("no action key mapping for action_id {action_id}")]
    ActionKeyNotFound {
        /// The action ID that could not be resolved.
        action_id: ActionId,
    },

    /// A referenced node was not found in the workflow.
    #[error("node not found: {node_id}")]
    NodeNotFound {
        /// The missing node ID.
        node_id: NodeId,
    },

    /// Execution planning failed.
    #[error("planning failed: {0}")]
    PlanningFailed(String),

    /// A node failed during execution.
    #[error("node {node_id} failed: {error}")]
    NodeFailed {
        /// The node that failed.
        node_id: NodeId,
        /// The error message.
        error: String,
    },

    /// The execution was cancelled.
    #[error("execution cancelled")]
    Cancelled,

    /// A budget limit was exceeded.
    #[error("budget exceeded: {0}")]
    BudgetExceeded(String),

    /// Error from the runtime layer.
    #[error("runtime error: {0}")]
    Runtime(#[from] nebula_runtime::RuntimeError),

    /// Error from the execution state layer.
    #[error("execution error: {0}")]
    Execution(#[from] nebula_execution::ExecutionError),

    /// A task panicked during execution.
    #[error("task panicked: {0}")]
    TaskPanicked(String),

    /// A node parameter failed to resolve (expression, template, or
    /// reference evaluation error).
    #[error("node {node_id} parameter {param_key}: {error}")]
    ParameterResolution {
        /// The node whose parameter failed to resolve.
        node_id: NodeId,
        /// The parameter key within the node's params map.
        param_key: String,
        /// The underlying resolution error message.
        error: String,
    },

    /// A node kind this engine build has no executor for.
    #[error("node {node_id} has unsupported kind `{kind}`")]
    UnsupportedNodeKind {
        /// The node with the unsupported kind.
        node_id: NodeId,
        /// The kind name (`NodeKind::kind_name()`).
        kind: &'static str,
    },

    /// An `llm`/`agent` node ran but no [`nebula_workflow::Registry`] was
    /// attached to the engine via `with_registry`.
    #[error("node {node_id}: no registry configured for provider/brain lookup")]
    ProviderNotConfigured {
        /// The node that needed a registry lookup.
        node_id: NodeId,
    },

    /// A `code` node ran but no sandbox was attached via `with_sandbox`.
    #[error("node {node_id}: no sandbox configured for code execution")]
    SandboxNotConfigured {
        /// The node that needed a sandbox.
        node_id: NodeId,
    },

    /// A `workflow`/`loop`/`parallel` node's nesting exceeded
    /// `ExecutionBudget::max_depth`.
    #[error("max execution depth {max} exceeded")]
    DepthExceeded {
        /// The configured maximum depth.
        max: u32,
    },

    /// Output failed its declared `output_schema`.
    #[error("node {node_id} output failed schema validation: {errors:?}")]
    OutputSchemaViolation {
        /// The node whose output was rejected.
        node_id: NodeId,
        /// The validation errors collected.
        errors: Vec<nebula_schema::ValidationError>,
    },

    /// A node ran longer than its effective timeout (`node.timeout` or
    /// `WorkflowConfig::default_node_timeout`).
    #[error("node {node_id} timed out after {elapsed_ms}ms")]
    NodeTimeout {
        /// The node that timed out.
        node_id: NodeId,
        /// How long it ran before being aborted.
        elapsed_ms: u64,
    },

    /// The workflow ran longer than `ExecutionBudget::max_wall_time`.
    #[error("workflow exceeded its wall-time budget of {limit_ms}ms")]
    WorkflowTimeout {
        /// The configured wall-time limit.
        limit_ms: u64,
    },

    /// An `llm` node's provider call failed. Carries the provider's own
    /// transient/permanent classification (`nebula_ports::ProviderError::
    /// is_retriable`) so the retry loop honors it instead of treating
    /// every provider failure as fatal.
    #[error("node {node_id} provider call failed: {error}")]
    ProviderFailed {
        /// The `llm` node whose provider call failed.
        node_id: NodeId,
        /// The underlying provider error message.
        error: String,
        /// Whether `nebula_ports::ProviderError::is_retriable()` said
        /// this was worth retrying.
        retriable: bool,
    },
}

impl EngineError {
    /// Whether retrying the operation that produced this error might
    /// succeed. Drives the engine's per-node retry loop: a `Fatal`
    /// runtime error or a planning/schema problem is never worth
    /// retrying, but a retryable action error or a timeout might clear up
    /// on its own.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Runtime(e) => e.is_retryable(),
            Self::NodeTimeout { .. } => true,
            Self::ProviderFailed { retriable, .. } => *retriable,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planning_failed_display() {
        let err = EngineError::PlanningFailed("no nodes".into());
        assert_eq!(err.to_string(), "planning failed: no nodes");
    }

    #[test]
    fn cancelled_display() {
        let err = EngineError::Cancelled;
        assert_eq!(err.to_string(), "execution cancelled");
    }

    #[test]
    fn budget_exceeded_display() {
        let err = EngineError::BudgetExceeded("max retries".into());
        assert_eq!(err.to_string(), "budget exceeded: max retries");
    }

    #[test]
    fn node_failed_display() {
        let node_id = NodeId::v4();
        let err = EngineError::NodeFailed {
            node_id,
            error: "timeout".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("timeout"));
        assert!(msg.contains("failed"));
    }

    #[test]
    fn node_timeout_is_retriable_but_planning_failed_is_not() {
        let timeout = EngineError::NodeTimeout {
            node_id: NodeId::v4(),
            elapsed_ms: 5000,
        };
        assert!(timeout.is_retriable());

        let planning = EngineError::PlanningFailed("bad graph".into());
        assert!(!planning.is_retriable());
    }

    #[test]
    fn provider_failed_honors_retriable_flag() {
        let node_id = NodeId::v4();
        let transient = EngineError::ProviderFailed {
            node_id,
            error: "rate limited".into(),
            retriable: true,
        };
        assert!(transient.is_retriable());

        let permanent = EngineError::ProviderFailed {
            node_id,
            error: "bad api key".into(),
            retriable: false,
        };
        assert!(!permanent.is_retriable());
    }

    #[test]
    fn workflow_timeout_display() {
        let err = EngineError::WorkflowTimeout { limit_ms: 3_600_000 };
        assert!(err.to_string().contains("3600000"));
    }
}
