//! The record every tier stores, retrieves, and searches over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single memory record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Caller-supplied key, unique within its identity/scope slice.
    pub key: String,
    /// Arbitrary content payload.
    pub content: Value,
    /// Optional caller-supplied metadata, matched by `search` filters.
    pub meta: Option<Value>,
    /// When this entry was first written.
    pub created_at: DateTime<Utc>,
    /// When this entry was last written (store overwrites update this).
    pub updated_at: DateTime<Utc>,
    /// SHA-256 of `content`, used by the semantic tier to dedup writes.
    pub content_hash: Option<String>,
}

impl MemoryEntry {
    pub(crate) fn new(key: String, content: Value, meta: Option<Value>, now: DateTime<Utc>) -> Self {
        Self {
            key,
            content,
            meta,
            created_at: now,
            updated_at: now,
            content_hash: None,
        }
    }

    /// `true` if `filters` is `None`, or every key/value pair in it matches
    /// the corresponding entry in `self.meta`.
    pub(crate) fn matches_filters(&self, filters: Option<&Value>) -> bool {
        let Some(filters) = filters.and_then(Value::as_object) else {
            return true;
        };
        let Some(meta) = self.meta.as_ref().and_then(Value::as_object) else {
            return filters.is_empty();
        };
        filters.iter().all(|(k, v)| meta.get(k) == Some(v))
    }
}

pub(crate) fn content_hash(content: &Value) -> String {
    use sha2::{Digest, Sha256};
    let bytes = serde_json::to_vec(content).unwrap_or_default();
    let digest = Sha256::digest(&bytes);
    format!("{digest:x}")
}
