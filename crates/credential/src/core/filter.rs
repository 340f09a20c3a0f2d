//! Filtering criteria for listing stored credentials.

use super::id::ScopeId;
use super::metadata::CredentialMetadata;

/// Criteria for narrowing [`crate::traits::StorageProvider::list`] results.
///
/// `None` fields are unconstrained; a filter with every field `None` matches
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialFilter {
    pub scope: Option<ScopeId>,
    pub tag: Option<(String, String)>,
}

impl CredentialFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(mut self, scope: ScopeId) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tag = Some((key.into(), value.into()));
        self
    }

    /// Returns `true` if `metadata` satisfies every constraint set on this filter.
    pub fn matches(&self, metadata: &CredentialMetadata) -> bool {
        if let Some(scope) = &self.scope
            && metadata.scope.as_ref() != Some(scope)
        {
            return false;
        }
        if let Some((key, value)) = &self.tag
            && metadata.tags.get(key) != Some(value)
        {
            return false;
        }
        true
    }
}
