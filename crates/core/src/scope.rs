//! Scope levels describing where a resource or context lives in the
//! identity hierarchy: `Global > Organization > Project > Workflow >
//! Execution > Action`.
//!
//! This is distinct from `nebula-resource`'s string-keyed [`Scope`], which
//! models multi-tenant resource visibility. `ScopeLevel` is the typed-ID
//! hierarchy carried on [`crate::traits::HasContext`] implementors (action
//! contexts, node contexts) to say "this code is running at exactly this
//! level of the tree".

use serde::{Deserialize, Serialize};

use crate::id::{ActionId, ExecutionId, OrganizationId, ProjectId, WorkflowId};

/// A single level of the Nebula identity/resource hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum ScopeLevel {
    /// Shared across every tenant; used by system-level contexts and tests.
    Global,
    /// Scoped to a single organization (multi-tenant boundary).
    Organization(OrganizationId),
    /// Scoped to a single project within an organization.
    Project(ProjectId),
    /// Scoped to a single workflow definition.
    Workflow(WorkflowId),
    /// Scoped to a single workflow execution.
    Execution(ExecutionId),
    /// Scoped to a single action invocation within an execution.
    Action(ActionId),
}

impl ScopeLevel {
    /// Hierarchy depth — lower is broader. `Global` is `0`.
    #[must_use]
    pub fn depth(&self) -> u8 {
        match self {
            Self::Global => 0,
            Self::Organization(_) => 1,
            Self::Project(_) => 2,
            Self::Workflow(_) => 3,
            Self::Execution(_) => 4,
            Self::Action(_) => 5,
        }
    }

    /// Whether `self` is broader than or equal to `other` in the hierarchy.
    ///
    /// This only compares depth, not identity chains — it answers "could
    /// `self` plausibly contain `other`", not "does it". Use
    /// [`crate::traits::Scoped::is_within`] for identity-aware containment.
    #[must_use]
    pub fn may_contain(&self, other: &ScopeLevel) -> bool {
        matches!(self, Self::Global) || self.depth() <= other.depth()
    }
}

impl Default for ScopeLevel {
    fn default() -> Self {
        Self::Global
    }
}

impl std::fmt::Display for ScopeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Organization(id) => write!(f, "organization:{id}"),
            Self::Project(id) => write!(f, "project:{id}"),
            Self::Workflow(id) => write!(f, "workflow:{id}"),
            Self::Execution(id) => write!(f, "execution:{id}"),
            Self::Action(id) => write!(f, "action:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_contains_everything() {
        let global = ScopeLevel::Global;
        let exec = ScopeLevel::Execution(ExecutionId::v4());
        assert!(global.may_contain(&exec));
        assert!(!exec.may_contain(&global));
    }

    #[test]
    fn depth_orders_hierarchy() {
        assert!(ScopeLevel::Global.depth() < ScopeLevel::Organization(OrganizationId::v4()).depth());
        assert!(
            ScopeLevel::Workflow(WorkflowId::v4()).depth()
                < ScopeLevel::Execution(ExecutionId::v4()).depth()
        );
    }

    #[test]
    fn default_is_global() {
        assert_eq!(ScopeLevel::default(), ScopeLevel::Global);
    }

    #[test]
    fn display_formats_variant_and_id() {
        let id = ExecutionId::v4();
        let s = ScopeLevel::Execution(id).to_string();
        assert!(s.starts_with("execution:"));
    }
}
