//! Common contract every memory tier implements: store, retrieve, search
//! by substring/filter, delete, and bulk clear.

use async_trait::async_trait;
use serde_json::Value;

use crate::entry::MemoryEntry;
use crate::error::MemoryError;
use crate::identity::{MemoryIdentity, MemoryScope};

/// A tiered key/value store scoped by caller identity.
///
/// Every method takes `identity`/`scope` first; implementations derive a
/// compound key from them via [`crate::identity::compound_key`] so a
/// caller can only ever see its own org's (and, for [`MemoryScope::Session`],
/// its own) entries.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Write `content` under `key`, replacing any existing entry.
    async fn store(
        &self,
        identity: &MemoryIdentity,
        scope: MemoryScope,
        key: &str,
        content: Value,
        meta: Option<Value>,
    ) -> Result<(), MemoryError>;

    /// Fetch the entry at `key`, or `None` if absent or expired.
    async fn retrieve(
        &self,
        identity: &MemoryIdentity,
        scope: MemoryScope,
        key: &str,
    ) -> Result<Option<MemoryEntry>, MemoryError>;

    /// Substring-match `query` against entry content, optionally narrowed by
    /// `filters` (an object of exact meta-field equalities), returning at
    /// most `k` entries ordered most-recently-updated first.
    async fn search(
        &self,
        identity: &MemoryIdentity,
        scope: MemoryScope,
        query: &str,
        k: usize,
        filters: Option<&Value>,
    ) -> Result<Vec<MemoryEntry>, MemoryError>;

    /// Remove the entry at `key`. Returns whether it existed.
    async fn delete(
        &self,
        identity: &MemoryIdentity,
        scope: MemoryScope,
        key: &str,
    ) -> Result<bool, MemoryError>;

    /// Remove every entry in this identity/scope slice whose key starts with
    /// `pattern` (or every entry in the slice, if `pattern` is `None`).
    /// Returns the number of entries removed.
    async fn clear(
        &self,
        identity: &MemoryIdentity,
        scope: MemoryScope,
        pattern: Option<&str>,
    ) -> Result<usize, MemoryError>;
}
