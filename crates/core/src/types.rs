//! Common value types shared across Nebula crates: semantic versions,
//! interface versions, and multi-tenancy classifiers.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A `major.minor.patch` semantic version, used for workflow definitions
/// and other artifacts that need full semver ordering (as opposed to the
/// two-component [`InterfaceVersion`] used for action/node schema
/// compatibility).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Construct a version from its three components.
    #[must_use]
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::new(0, 1, 0)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A two-component `major.minor` interface version for action/node
/// metadata. Unlike [`Version`], compatibility is asymmetric: a consumer
/// requiring version `R` accepts any provider version `P` where
/// `P.major == R.major && P.minor >= R.minor` (additive, backward-compatible
/// minor revisions; breaking changes bump major).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceVersion {
    pub major: u32,
    pub minor: u32,
}

impl InterfaceVersion {
    /// Construct an interface version from its major/minor components.
    #[must_use]
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Whether `other` (a provider's actual version) satisfies `self` (the
    /// consumer's required version): same major, `other.minor >= self.minor`.
    #[must_use]
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        self.major == other.major && other.minor >= self.minor
    }
}

impl fmt::Display for InterfaceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Tier of a project, used to gate feature availability and resource
/// quotas (execution concurrency, memory tier limits, sandbox budgets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    /// Single-user project with the tightest default quotas.
    Personal,
    /// Shared project owned by a team within an organization.
    Team,
    /// Organization-wide project with enterprise quotas and audit
    /// requirements.
    Enterprise,
}

/// The level at which a role grants access, paired against a
/// [`crate::scope::ScopeLevel`] at authorization time (a role scoped at
/// `Project` grants access to every `Workflow`/`Execution`/`Action` nested
/// under that project, but not to other projects).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleScope {
    /// Grants access across the entire organization.
    Organization,
    /// Grants access within a single project.
    Project,
    /// Grants access within a single workflow definition.
    Workflow,
    /// Grants access within a single execution only.
    Execution,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_orders_by_components() {
        assert!(Version::new(1, 0, 0) < Version::new(1, 0, 1));
        assert!(Version::new(1, 2, 0) < Version::new(2, 0, 0));
    }

    #[test]
    fn version_display() {
        assert_eq!(Version::new(0, 1, 0).to_string(), "0.1.0");
    }

    #[test]
    fn interface_version_compat() {
        let required = InterfaceVersion::new(1, 0);
        assert!(required.is_compatible_with(&InterfaceVersion::new(1, 2)));
        assert!(!InterfaceVersion::new(1, 2).is_compatible_with(&required));
        assert!(!required.is_compatible_with(&InterfaceVersion::new(2, 0)));
    }

    #[test]
    fn project_type_serializes_snake_case() {
        let json = serde_json::to_string(&ProjectType::Enterprise).unwrap();
        assert_eq!(json, "\"enterprise\"");
    }
}
