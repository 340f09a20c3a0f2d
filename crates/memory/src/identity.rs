//! Caller identity and scope used to partition every memory read/write.
//!
//! RBAC is enforced by construction rather than by a runtime check: the
//! compound key every tier stores under embeds `org_id` (and, for
//! user-private scopes, `user_id`), so a caller from a different org or
//! a different user's session simply derives a different key — there is
//! no entry to find, not a permission check that might be forgotten.

use nebula_core::id::{OrganizationId, UserId};

/// `{org_id, user_id}` identity every [`crate::store::MemoryStore`] call
/// is made as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryIdentity {
    /// The caller's organization.
    pub org_id: OrganizationId,
    /// The caller's user.
    pub user_id: UserId,
}

impl MemoryIdentity {
    /// Build an identity from its org/user pair.
    #[must_use]
    pub fn new(org_id: OrganizationId, user_id: UserId) -> Self {
        Self { org_id, user_id }
    }
}

/// Visibility scope for a memory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryScope {
    /// User-private — visible only to the identity that wrote it.
    Session,
    /// Org-shared knowledge base — visible to every user in the org.
    Kb,
}

impl MemoryScope {
    fn segment(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Kb => "kb",
        }
    }
}

/// Derive the compound key a tier stores an entry under.
///
/// Org-shared (`Kb`) keys omit `user_id` entirely so every user in the org
/// derives the same key; user-private (`Session`) keys include it so a
/// different user's identical `key` string lands in a different slot.
#[must_use]
pub fn compound_key(identity: &MemoryIdentity, scope: MemoryScope, key: &str) -> String {
    match scope {
        MemoryScope::Kb => format!("{}:{}:{key}", identity.org_id, scope.segment()),
        MemoryScope::Session => {
            format!("{}:{}:{}:{key}", identity.org_id, scope.segment(), identity.user_id)
        }
    }
}

/// Prefix shared by every key a given identity/scope pair can see — used by
/// `search`/`clear`/vector `query` to iterate only the caller's own slice.
#[must_use]
pub fn scope_prefix(identity: &MemoryIdentity, scope: MemoryScope) -> String {
    match scope {
        MemoryScope::Kb => format!("{}:{}:", identity.org_id, scope.segment()),
        MemoryScope::Session => {
            format!("{}:{}:{}:", identity.org_id, scope.segment(), identity.user_id)
        }
    }
}
