//! Semantic memory: durable, vectorized, for content retrieved by meaning
//! rather than exact key — summaries, distilled facts, documents a
//! workflow should recall across unrelated runs.
//!
//! Grounded on the nearest-neighbour search pattern used by
//! `InMemoryVectorStore` in the broader example pack's retrieval-augmented
//! agent, adapted with two additions that reference lacked: a stable
//! key-ascending tie-break so `query` is deterministic, and dimension
//! validation that raises [`MemoryError::DimensionMismatch`] instead of
//! panicking on a mismatched embedding.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use serde_json::Value;
use std::cmp::Ordering;

use crate::entry::{content_hash, MemoryEntry};
use crate::error::MemoryError;
use crate::identity::{compound_key, scope_prefix, MemoryIdentity, MemoryScope};
use crate::store::MemoryStore;
use crate::vector::{cosine_similarity, VectorIndex};

struct Row {
    entry: MemoryEntry,
    vector: Option<Vec<f32>>,
    model_version: Option<String>,
}

/// Durable, dimension-checked vector store backing the semantic tier.
pub struct SemanticMemory {
    dimension: usize,
    ttl_days: i64,
    data: DashMap<String, Row>,
}

impl SemanticMemory {
    /// `dimension` is fixed for the lifetime of the store: every `upsert`
    /// and `query` vector must have exactly this length. `ttl_days` governs
    /// [`Self::decay`].
    #[must_use]
    pub fn new(dimension: usize, ttl_days: i64) -> Self {
        Self {
            dimension,
            ttl_days,
            data: DashMap::new(),
        }
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), MemoryError> {
        if vector.len() != self.dimension {
            return Err(MemoryError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Delete every entry whose `updated_at` is older than `ttl_days`,
    /// except keys starting with one of `protected_prefixes` (e.g.
    /// `"summary:"` rows a workflow should never lose to decay). Returns
    /// the number of rows removed.
    pub fn decay(&self, protected_prefixes: &[&str]) -> usize {
        let cutoff = Utc::now() - ChronoDuration::days(self.ttl_days);
        let before = self.data.len();
        self.data.retain(|_, row| {
            let protected = protected_prefixes.iter().any(|p| row.entry.key.starts_with(p));
            protected || row.entry.updated_at > cutoff
        });
        let removed = before - self.data.len();
        if removed > 0 {
            tracing::debug!(removed, ttl_days = self.ttl_days, "decayed semantic memory entries");
        }
        removed
    }
}

#[async_trait]
impl MemoryStore for SemanticMemory {
    async fn store(
        &self,
        identity: &MemoryIdentity,
        scope: MemoryScope,
        key: &str,
        content: Value,
        meta: Option<Value>,
    ) -> Result<(), MemoryError> {
        let now = Utc::now();
        let compound = compound_key(identity, scope, key);
        let hash = content_hash(&content);

        if let Some(existing) = self.data.get(&compound) {
            if existing.entry.content_hash.as_deref() == Some(hash.as_str()) {
                return Ok(());
            }
        }

        let created_at = self
            .data
            .get(&compound)
            .map(|row| row.entry.created_at)
            .unwrap_or(now);
        let mut entry = MemoryEntry::new(key.to_owned(), content, meta, now);
        entry.created_at = created_at;
        entry.content_hash = Some(hash);

        let vector = self.data.get(&compound).and_then(|row| row.vector.clone());
        let model_version = self.data.get(&compound).and_then(|row| row.model_version.clone());
        self.data.insert(compound, Row { entry, vector, model_version });
        Ok(())
    }

    async fn retrieve(
        &self,
        identity: &MemoryIdentity,
        scope: MemoryScope,
        key: &str,
    ) -> Result<Option<MemoryEntry>, MemoryError> {
        let compound = compound_key(identity, scope, key);
        Ok(self.data.get(&compound).map(|row| row.entry.clone()))
    }

    async fn search(
        &self,
        identity: &MemoryIdentity,
        scope: MemoryScope,
        query: &str,
        k: usize,
        filters: Option<&Value>,
    ) -> Result<Vec<MemoryEntry>, MemoryError> {
        let prefix = scope_prefix(identity, scope);
        let needle = query.to_lowercase();
        let mut matches: Vec<MemoryEntry> = self
            .data
            .iter()
            .filter(|e| e.key().starts_with(&prefix))
            .map(|e| e.value().entry.clone())
            .filter(|e| e.matches_filters(filters))
            .filter(|e| needle.is_empty() || e.content.to_string().to_lowercase().contains(&needle))
            .collect();
        matches.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.key.cmp(&b.key)));
        matches.truncate(k);
        Ok(matches)
    }

    async fn delete(
        &self,
        identity: &MemoryIdentity,
        scope: MemoryScope,
        key: &str,
    ) -> Result<bool, MemoryError> {
        let compound = compound_key(identity, scope, key);
        Ok(self.data.remove(&compound).is_some())
    }

    async fn clear(
        &self,
        identity: &MemoryIdentity,
        scope: MemoryScope,
        pattern: Option<&str>,
    ) -> Result<usize, MemoryError> {
        let prefix = scope_prefix(identity, scope);
        let full_prefix = match pattern {
            Some(p) => format!("{prefix}{p}"),
            None => prefix,
        };
        let before = self.data.len();
        self.data.retain(|k, _| !k.starts_with(&full_prefix));
        Ok(before - self.data.len())
    }
}

#[async_trait]
impl VectorIndex for SemanticMemory {
    async fn upsert(
        &self,
        identity: &MemoryIdentity,
        scope: MemoryScope,
        key: &str,
        vector: Vec<f32>,
        model_version: &str,
    ) -> Result<(), MemoryError> {
        self.check_dimension(&vector)?;
        let now = Utc::now();
        let compound = compound_key(identity, scope, key);

        let mut entry = self
            .data
            .get(&compound)
            .map(|row| row.entry.clone())
            .unwrap_or_else(|| MemoryEntry::new(key.to_owned(), Value::Null, None, now));
        entry.updated_at = now;

        self.data.insert(
            compound,
            Row {
                entry,
                vector: Some(vector),
                model_version: Some(model_version.to_owned()),
            },
        );
        Ok(())
    }

    async fn query(
        &self,
        identity: &MemoryIdentity,
        scope: MemoryScope,
        vector: &[f32],
        k: usize,
        filter: Option<&Value>,
    ) -> Result<Vec<(String, f32)>, MemoryError> {
        self.check_dimension(vector)?;
        let prefix = scope_prefix(identity, scope);

        let mut scored: Vec<(String, f32)> = self
            .data
            .iter()
            .filter(|e| e.key().starts_with(&prefix))
            .filter(|e| e.value().entry.matches_filters(filter))
            .filter_map(|e| {
                e.value()
                    .vector
                    .as_ref()
                    .map(|v| (e.value().entry.key.clone(), cosine_similarity(vector, v)))
            })
            .collect();

        scored.sort_by(|a, b| match b.1.partial_cmp(&a.1) {
            Some(Ordering::Equal) | None => a.0.cmp(&b.0),
            Some(ord) => ord,
        });
        scored.truncate(k);
        Ok(scored)
    }
}
