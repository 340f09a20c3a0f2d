//! Base traits shared by Nebula entities: identity, scoping, and
//! execution-context access.

use crate::id::{ExecutionId, NodeId, WorkflowId};
use crate::scope::ScopeLevel;

/// A type that carries a stable, strongly-typed identifier.
pub trait Identifiable {
    /// The identifier type (e.g. [`crate::id::WorkflowId`]).
    type Id: Copy + Eq;

    /// Return this entity's identifier.
    fn id(&self) -> Self::Id;
}

/// A type that lives at a specific level of the identity hierarchy.
///
/// The blanket [`Scoped::is_within`] check only compares hierarchy depth
/// (via [`ScopeLevel::may_contain`]); implementors that need full
/// identity-chain containment (e.g. "this execution belongs to that
/// workflow") should override it.
pub trait Scoped {
    /// Return the scope level this entity is running or defined at.
    fn scope(&self) -> ScopeLevel;

    /// Whether this entity's scope is contained within `boundary`.
    fn is_within(&self, boundary: &ScopeLevel) -> bool {
        boundary.may_contain(&self.scope())
    }
}

/// A type that can report the execution/workflow/node triple it is
/// currently running under, if any. Implemented by per-crate execution
/// contexts (e.g. `nebula_action::context::ActionContext`) so that
/// cross-cutting concerns — logging, telemetry, memory scoping — can read
/// the ambient identity without depending on the concrete context type.
pub trait HasContext {
    /// The execution this context belongs to, if one is active.
    fn execution_id(&self) -> Option<ExecutionId>;

    /// The workflow this context belongs to, if one is active.
    fn workflow_id(&self) -> Option<WorkflowId>;

    /// The node this context is executing, if any.
    fn node_id(&self) -> Option<NodeId>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::WorkflowId;

    struct Thing(WorkflowId);

    impl Identifiable for Thing {
        type Id = WorkflowId;
        fn id(&self) -> WorkflowId {
            self.0
        }
    }

    impl Scoped for Thing {
        fn scope(&self) -> ScopeLevel {
            ScopeLevel::Workflow(self.0)
        }
    }

    #[test]
    fn identifiable_returns_id() {
        let id = WorkflowId::v4();
        let thing = Thing(id);
        assert_eq!(thing.id(), id);
    }

    #[test]
    fn scoped_is_within_global_boundary() {
        let thing = Thing(WorkflowId::v4());
        assert!(thing.is_within(&ScopeLevel::Global));
    }

    #[test]
    fn scoped_is_not_within_narrower_boundary() {
        let thing = Thing(WorkflowId::v4());
        let narrower = ScopeLevel::Execution(crate::id::ExecutionId::v4());
        assert!(!thing.is_within(&narrower));
    }
}
