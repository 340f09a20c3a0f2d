//! The workflow definition itself: nodes, connections, and workflow-level
//! configuration.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use nebula_core::{Version, id::WorkflowId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::node::NodeDefinition;

/// A directed edge from one node to another.
///
/// Connections, not a per-node `dependencies` list, are the wire format for
/// the dependency graph: a node's predecessors are exactly the set of
/// connections whose `to` equals its ID. This mirrors the DAG's own graph
/// representation and avoids a second, possibly inconsistent, source of
/// truth for edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Source node.
    pub from: nebula_core::id::NodeId,
    /// Destination node.
    pub to: nebula_core::id::NodeId,
}

impl Connection {
    /// Construct a connection from a source and destination node ID.
    #[must_use]
    pub fn new(from: nebula_core::id::NodeId, to: nebula_core::id::NodeId) -> Self {
        Self { from, to }
    }
}

/// How the engine reacts when a node fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FailurePolicy {
    /// Stop scheduling new nodes the moment any node fails. Nodes already
    /// running are left to finish; everything not yet dispatched ends up
    /// `Skipped`. The default — matches the old, pre-policy behavior.
    #[default]
    Halt,
    /// Keep running everything that doesn't transitively depend on the
    /// failed node. Descendants of the failure are marked `Skipped`;
    /// independent branches run to completion.
    ContinuePossible,
    /// Keep running everything, including descendants of a failed node
    /// (they receive `null` in place of the failed predecessor's output).
    /// Every node gets a terminal state; the workflow overall still
    /// reports failure if any node failed.
    ContinueAll,
}

/// Workflow-level execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Upper bound on nodes executed concurrently within one parallel
    /// group.
    pub max_concurrent_nodes: usize,
    /// Default per-node timeout, used when a node has no override.
    #[serde(with = "crate::serde_duration")]
    pub default_node_timeout: Duration,
    /// Overall workflow execution timeout.
    #[serde(default, with = "crate::serde_duration_opt")]
    pub workflow_timeout: Option<Duration>,
    /// How to react when a node fails.
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_concurrent_nodes: 16,
            default_node_timeout: Duration::from_secs(30),
            workflow_timeout: None,
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// A complete workflow: identity, graph structure, and configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Unique workflow ID.
    pub id: WorkflowId,
    /// Human-readable name.
    pub name: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Semantic version of this workflow definition.
    pub version: Version,
    /// All nodes in the workflow.
    pub nodes: Vec<NodeDefinition>,
    /// Edges between nodes.
    pub connections: Vec<Connection>,
    /// Workflow-scoped variables, available via `$workflow` in expressions.
    pub variables: HashMap<String, Value>,
    /// Execution configuration.
    pub config: WorkflowConfig,
    /// Free-form tags for search/filtering.
    pub tags: Vec<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl WorkflowDefinition {
    /// Construct a new, empty workflow with the given name.
    ///
    /// Nodes and connections are added afterward; `id`, `created_at`, and
    /// `updated_at` are stamped immediately.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: WorkflowId::v4(),
            name: name.into(),
            description: None,
            version: Version::default(),
            nodes: Vec::new(),
            connections: Vec::new(),
            variables: HashMap::new(),
            config: WorkflowConfig::default(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The node with the given ID, if present.
    #[must_use]
    pub fn node(&self, id: nebula_core::id::NodeId) -> Option<&NodeDefinition> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
