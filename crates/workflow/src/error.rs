//! Errors for workflow definition, graph construction, and compilation.

use nebula_core::id::NodeId;

/// Errors raised while constructing or validating a workflow's structure.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum WorkflowError {
    /// The workflow has no nodes.
    #[error("workflow has no nodes")]
    EmptyWorkflow,

    /// A connection referenced a node that doesn't exist.
    #[error("connection references unknown node `{0}`")]
    UnknownNode(NodeId),

    /// The dependency graph contains a cycle.
    #[error("dependency cycle detected involving node(s): {0:?}")]
    CycleDetected(Vec<NodeId>),

    /// A node's declared state transition is invalid.
    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// The state being transitioned from.
        from: String,
        /// The state being transitioned to.
        to: String,
    },

    /// A node ID appeared more than once in the workflow.
    #[error("duplicate node id `{0}`")]
    DuplicateNode(NodeId),

    /// A registry import path did not resolve within its kind space.
    #[error("no `{space}` import registered at `{import}`")]
    UnknownImport {
        /// The kind space the import was looked up in.
        space: String,
        /// The dotted import path that failed to resolve.
        import: String,
    },

    /// `register_factory` was called for a `name` already bound to a
    /// different `import_path` in the same kind space, without `force`.
    #[error(
        "`{name}` is already registered in `{space}` at `{existing_import_path}`; \
         pass force=true to replace it"
    )]
    DuplicateRegistration {
        /// The kind space the collision occurred in.
        space: String,
        /// The registration name that collided.
        name: String,
        /// The import path already bound to `name`.
        existing_import_path: String,
    },

    /// Compilation failed; carries every validation error collected across
    /// the compiler's phases (not just the first).
    #[error("workflow compilation failed with {} error(s)", .0.len())]
    CompilationFailed(Vec<nebula_validator::core::error::ValidationError>),
}
