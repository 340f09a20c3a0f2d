//! Node definitions — the per-kind unit of work inside a workflow.
//!
//! A [`NodeDefinition`] pairs an identity (`id`, `name`) with a [`NodeKind`],
//! a discriminated union covering every node kind the engine knows how to
//! run: `tool`, `llm`, `condition`, `loop`, `parallel`, `workflow`, `code`,
//! `agent`, `human`, `monitor`. The `kind` payload carries exactly the
//! per-kind configuration that kind's executor needs; parameters that must
//! be resolved at execution time (literals, `{{ expr }}` templates,
//! upstream-output references) are [`ParamValue`](crate::context::ParamValue)s.

use std::collections::HashMap;
use std::time::Duration;

use nebula_core::id::{ActionId, NodeId, WorkflowId};
use nebula_schema::Schema;
use serde::{Deserialize, Serialize};

use crate::context::ParamValue;

/// Runtime state of a single node within an execution.
///
/// Mirrors the lifecycle a node moves through as the engine schedules and
/// runs it; invalid transitions are rejected by [`transition_to`].
///
/// [`transition_to`]: NodeRuntimeState::transition_to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    /// Waiting on upstream dependencies.
    Pending,
    /// All dependencies satisfied, eligible to run.
    Ready,
    /// Currently executing.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
    /// Skipped (branch not taken, upstream skip propagated).
    Skipped,
    /// Cancelled before completion.
    Cancelled,
}

impl NodeState {
    /// Whether this state is terminal (no further transitions expected).
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Skipped | Self::Cancelled
        )
    }

    fn can_transition_to(self, next: Self) -> bool {
        use NodeState::{Cancelled, Completed, Failed, Pending, Ready, Running, Skipped};
        matches!(
            (self, next),
            (Pending, Ready)
                | (Pending, Skipped)
                | (Pending, Cancelled)
                | (Ready, Running)
                | (Ready, Skipped)
                | (Ready, Cancelled)
                | (Running, Completed)
                | (Running, Failed)
                | (Running, Cancelled)
        )
    }
}

/// Per-node runtime state tracked by the execution engine: current
/// [`NodeState`] plus the error message recorded on failure, if any.
#[derive(Debug, Clone)]
pub struct NodeRuntimeState {
    /// Current lifecycle state.
    pub state: NodeState,
    /// Error message recorded when `state` transitions to `Failed`.
    pub error_message: Option<String>,
}

impl NodeRuntimeState {
    /// Create a fresh runtime state in [`NodeState::Pending`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: NodeState::Pending,
            error_message: None,
        }
    }

    /// Attempt a state transition, rejecting transitions not allowed by
    /// the node lifecycle (e.g. `Completed` -> `Running`).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::WorkflowError::InvalidTransition`] if the
    /// transition is not legal.
    pub fn transition_to(&mut self, next: NodeState) -> Result<(), crate::error::WorkflowError> {
        if !self.state.can_transition_to(next) {
            return Err(crate::error::WorkflowError::InvalidTransition {
                from: format!("{:?}", self.state),
                to: format!("{next:?}"),
            });
        }
        self.state = next;
        Ok(())
    }
}

impl Default for NodeRuntimeState {
    fn default() -> Self {
        Self::new()
    }
}

/// A human-in-the-loop approval request carried by [`NodeKind::Human`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanApproval {
    /// Message shown to the approver(s).
    pub prompt: String,
    /// Identifiers of users allowed to act on this approval.
    pub approvers: Vec<String>,
    /// How long to wait before the approval times out.
    pub timeout: Option<Duration>,
}

/// Per-kind node configuration.
///
/// `serde(tag = "type")` keeps the discriminator explicit in blueprint JSON
/// (`{"type": "tool", ...}`), matching the dotted external wire format the
/// compiler and registry both key off of.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// Invoke a registered action (the most common node kind).
    Tool {
        /// The action to invoke.
        action_id: ActionId,
        /// Parameters passed to the action, resolved at execution time.
        #[serde(default)]
        params: HashMap<String, ParamValue>,
    },
    /// Invoke an LLM provider.
    Llm {
        /// Logical provider key (resolved through the registry's
        /// `llm_operator` space).
        provider: String,
        /// Model identifier understood by that provider.
        model: String,
        /// The prompt, possibly templated.
        prompt: ParamValue,
        /// Additional provider parameters (temperature, max_tokens, ...).
        #[serde(default)]
        params: HashMap<String, ParamValue>,
    },
    /// Evaluate a boolean expression and branch.
    Condition {
        /// The `{{ expr }}`-style boolean expression to evaluate.
        expr: String,
    },
    /// Repeat a sub-graph of node IDs until a condition is met or a
    /// maximum iteration count is reached.
    Loop {
        /// Node IDs forming the loop body, executed each iteration.
        body: Vec<NodeId>,
        /// Hard cap on iterations, independent of `condition`.
        max_iterations: u32,
        /// Optional continue-condition; absent means run exactly
        /// `max_iterations` times.
        condition: Option<String>,
    },
    /// Run multiple branches concurrently and join their outputs.
    Parallel {
        /// Each inner vector is one branch's ordered node IDs.
        branches: Vec<Vec<NodeId>>,
    },
    /// Invoke another workflow as a sub-execution.
    Workflow {
        /// The sub-workflow to run.
        workflow_id: WorkflowId,
        /// Maps sub-workflow input keys to values resolved in this scope.
        #[serde(default)]
        input_mapping: HashMap<String, ParamValue>,
    },
    /// Run a sandboxed code snippet.
    Code {
        /// The sandboxed runtime language (e.g. `"python"`, `"javascript"`).
        language: String,
        /// Source code to execute.
        source: String,
        /// Parameters made available to the snippet as `$input`.
        #[serde(default)]
        params: HashMap<String, ParamValue>,
    },
    /// Run an autonomous think/act loop bounded by `max_steps`.
    Agent {
        /// Registered agent class to instantiate (`RegistrySpace::Agent`
        /// import key).
        agent_class: String,
        /// Registry keys of tools the agent may invoke.
        tools: Vec<String>,
        /// Hard cap on think/act iterations.
        max_steps: u32,
        /// Parameters available to the agent's initial prompt/goal.
        #[serde(default)]
        params: HashMap<String, ParamValue>,
    },
    /// Pause for human approval.
    Human {
        /// The approval request.
        approval: HumanApproval,
    },
    /// Periodically evaluate a condition without gating downstream flow.
    Monitor {
        /// The expression checked on each tick.
        expr: String,
        /// How often to evaluate `expr`.
        interval: Duration,
    },
}

impl NodeKind {
    /// Short, stable kind name matching the `type` discriminator.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Tool { .. } => "tool",
            Self::Llm { .. } => "llm",
            Self::Condition { .. } => "condition",
            Self::Loop { .. } => "loop",
            Self::Parallel { .. } => "parallel",
            Self::Workflow { .. } => "workflow",
            Self::Code { .. } => "code",
            Self::Agent { .. } => "agent",
            Self::Human { .. } => "human",
            Self::Monitor { .. } => "monitor",
        }
    }
}

/// A single node in a workflow's graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// Unique node ID within the workflow.
    pub id: NodeId,
    /// Human-readable name.
    pub name: String,
    /// Per-kind configuration.
    pub kind: NodeKind,
    /// Retry policy override; `None` defers to the workflow/engine default.
    #[serde(default)]
    pub retry: Option<RetryPolicy>,
    /// Execution timeout override.
    #[serde(default, with = "crate::serde_duration_opt")]
    pub timeout: Option<Duration>,
    /// Declared input shape. Required (and must be non-empty) on `tool`
    /// nodes; the compiler checks it against upstream output schemas
    /// when both sides declare one.
    #[serde(default)]
    pub input_schema: Option<Schema>,
    /// Declared output shape. Required (and must be non-empty) on `tool`
    /// nodes.
    #[serde(default)]
    pub output_schema: Option<Schema>,
    /// Whether the engine may serve a cached result for identical
    /// `(node, resolved inputs)` pairs instead of re-running this node.
    #[serde(default)]
    pub use_cache: bool,
}

/// Retry policy for a node that fails with a retryable error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (not counting the first try).
    pub max_attempts: u32,
    /// Base delay before the first retry.
    #[serde(with = "crate::serde_duration")]
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl NodeDefinition {
    /// Construct a `tool`-kind node with no parameters.
    ///
    /// This is the common case (a node that invokes a single registered
    /// action by ID) and is kept as a direct constructor so call sites
    /// that only need an action dispatch don't have to spell out the full
    /// [`NodeKind::Tool`] variant.
    #[must_use]
    pub fn new(id: NodeId, name: impl Into<String>, action_id: ActionId) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::Tool {
                action_id,
                params: HashMap::new(),
            },
            retry: None,
            timeout: None,
            input_schema: None,
            output_schema: None,
            use_cache: false,
        }
    }

    /// Construct a node of any kind.
    #[must_use]
    pub fn with_kind(id: NodeId, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            retry: None,
            timeout: None,
            input_schema: None,
            output_schema: None,
            use_cache: false,
        }
    }

    /// The action ID this node invokes, if it is a `tool` node.
    #[must_use]
    pub fn action_id(&self) -> Option<ActionId> {
        match &self.kind {
            NodeKind::Tool { action_id, .. } => Some(*action_id),
            _ => None,
        }
    }

    /// Attach a retry policy, builder-style.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Attach a timeout, builder-style.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Declare input/output schemas, builder-style.
    #[must_use]
    pub fn with_schemas(mut self, input: Schema, output: Schema) -> Self {
        self.input_schema = Some(input);
        self.output_schema = Some(output);
        self
    }

    /// Enable result caching for this node, builder-style.
    #[must_use]
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Whether this node's declared schemas satisfy the non-empty rule
    /// `tool` nodes must follow (spec.md §3): both `input_schema` and
    /// `output_schema` present and each declaring at least one property.
    #[must_use]
    pub fn has_valid_tool_schemas(&self) -> bool {
        matches!(&self.input_schema, Some(s) if s.is_non_empty())
            && matches!(&self.output_schema, Some(s) if s.is_non_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_convenience_constructor_sets_action_id() {
        let id = NodeId::v4();
        let action_id = ActionId::v4();
        let node = NodeDefinition::new(id, "fetch", action_id);
        assert_eq!(node.action_id(), Some(action_id));
        assert_eq!(node.kind.kind_name(), "tool");
    }

    #[test]
    fn non_tool_node_has_no_action_id() {
        let node = NodeDefinition::with_kind(
            NodeId::v4(),
            "branch",
            NodeKind::Condition {
                expr: "$input.ok".into(),
            },
        );
        assert_eq!(node.action_id(), None);
    }

    #[test]
    fn state_machine_rejects_illegal_transition() {
        let mut state = NodeRuntimeState::new();
        assert!(state.transition_to(NodeState::Running).is_err());
        assert!(state.transition_to(NodeState::Ready).is_ok());
        assert!(state.transition_to(NodeState::Running).is_ok());
        assert!(state.transition_to(NodeState::Completed).is_ok());
        assert!(state.state.is_terminal());
    }

    #[test]
    fn node_kind_serde_tag_roundtrips() {
        let kind = NodeKind::Code {
            language: "python".into(),
            source: "return 1".into(),
            params: HashMap::new(),
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["type"], "code");
        let back: NodeKind = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind_name(), "code");
    }
}
