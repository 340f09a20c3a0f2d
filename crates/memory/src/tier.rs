//! Shared in-memory backing for the working, episodic, and procedural
//! tiers — they differ only in their default TTL policy, not in how they
//! store or search entries.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use serde_json::Value;
use std::time::Duration;

use crate::entry::MemoryEntry;
use crate::error::MemoryError;
use crate::identity::{compound_key, scope_prefix, MemoryIdentity, MemoryScope};
use crate::store::MemoryStore;

/// TTL policy for an [`InMemoryTier`]. `None` means entries never expire.
#[derive(Debug, Clone, Copy)]
pub struct TierLimits {
    /// TTL applied to every write in this tier. `None` means durable.
    pub default_ttl: Option<Duration>,
}

impl TierLimits {
    /// A tier with a fixed, non-optional TTL.
    #[must_use]
    pub fn ttl(d: Duration) -> Self {
        Self { default_ttl: Some(d) }
    }

    /// A tier whose entries never expire on their own.
    #[must_use]
    pub fn durable() -> Self {
        Self { default_ttl: None }
    }
}

struct Row {
    entry: MemoryEntry,
    expires_at: Option<DateTime<Utc>>,
}

/// A `DashMap`-backed [`MemoryStore`] shared by the working, episodic, and
/// procedural tiers.
///
/// The episodic tier's natural backend would be a fast external KV store
/// (Redis or similar); no such crate is in this workspace's dependency
/// graph, so — consistent with `nebula-execution`'s `ExecutionRepo` — it
/// falls back to this in-process map. Swapping in a real backend later
/// only requires a new `MemoryStore` impl behind the same trait.
pub struct InMemoryTier {
    limits: TierLimits,
    data: DashMap<String, Row>,
}

impl InMemoryTier {
    /// Construct an empty tier with the given TTL policy.
    #[must_use]
    pub fn new(limits: TierLimits) -> Self {
        Self {
            limits,
            data: DashMap::new(),
        }
    }

    fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.limits
            .default_ttl
            .and_then(|d| ChronoDuration::from_std(d).ok())
            .map(|d| now + d)
    }

    fn is_live(row: &Row, now: DateTime<Utc>) -> bool {
        row.expires_at.is_none_or(|exp| exp > now)
    }

    /// Drop every expired row. Not on the read path's critical section —
    /// callers invoke this opportunistically (e.g. a background sweep).
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.data.len();
        self.data.retain(|_, row| Self::is_live(row, now));
        let removed = before - self.data.len();
        if removed > 0 {
            tracing::debug!(removed, "swept expired memory entries");
        }
        removed
    }
}

#[async_trait]
impl MemoryStore for InMemoryTier {
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
        let created_at = self
            .data
            .get(&compound)
            .filter(|row| Self::is_live(row, now))
            .map(|row| row.entry.created_at)
            .unwrap_or(now);

        let mut entry = MemoryEntry::new(key.to_owned(), content, meta, now);
        entry.created_at = created_at;

        self.data.insert(
            compound,
            Row {
                entry,
                expires_at: self.expires_at(now),
            },
        );
        Ok(())
    }

    async fn retrieve(
        &self,
        identity: &MemoryIdentity,
        scope: MemoryScope,
        key: &str,
    ) -> Result<Option<MemoryEntry>, MemoryError> {
        let compound = compound_key(identity, scope, key);
        let now = Utc::now();
        match self.data.get(&compound) {
            Some(row) if Self::is_live(&row, now) => Ok(Some(row.entry.clone())),
            Some(_) => {
                self.data.remove(&compound);
                Ok(None)
            }
            None => Ok(None),
        }
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
        let now = Utc::now();
        let needle = query.to_lowercase();

        let mut matches: Vec<MemoryEntry> = self
            .data
            .iter()
            .filter(|entry| entry.key().starts_with(&prefix))
            .filter(|entry| Self::is_live(entry.value(), now))
            .map(|entry| entry.value().entry.clone())
            .filter(|entry| entry.matches_filters(filters))
            .filter(|entry| {
                needle.is_empty()
                    || entry
                        .content
                        .to_string()
                        .to_lowercase()
                        .contains(&needle)
            })
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

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_core::id::{OrganizationId, UserId};
    use serde_json::json;

    fn identity() -> MemoryIdentity {
        MemoryIdentity::new(OrganizationId::v4(), UserId::v4())
    }

    #[tokio::test]
    async fn store_then_retrieve_round_trips() {
        let tier = InMemoryTier::new(TierLimits::durable());
        let id = identity();
        tier.store(&id, MemoryScope::Session, "a", json!({"v": 1}), None)
            .await
            .unwrap();
        let got = tier.retrieve(&id, MemoryScope::Session, "a").await.unwrap();
        assert_eq!(got.unwrap().content, json!({"v": 1}));
    }

    #[tokio::test]
    async fn expired_entry_is_not_returned() {
        let tier = InMemoryTier::new(TierLimits::ttl(Duration::from_millis(0)));
        let id = identity();
        tier.store(&id, MemoryScope::Session, "a", json!(1), None)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let got = tier.retrieve(&id, MemoryScope::Session, "a").await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn cross_org_retrieve_returns_none() {
        let tier = InMemoryTier::new(TierLimits::durable());
        let writer = identity();
        tier.store(&writer, MemoryScope::Kb, "doc", json!("hi"), None)
            .await
            .unwrap();
        let reader = MemoryIdentity::new(OrganizationId::v4(), writer.user_id);
        let got = tier.retrieve(&reader, MemoryScope::Kb, "doc").await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn session_scope_is_user_private() {
        let tier = InMemoryTier::new(TierLimits::durable());
        let writer = identity();
        tier.store(&writer, MemoryScope::Session, "draft", json!("mine"), None)
            .await
            .unwrap();
        let other = MemoryIdentity::new(writer.org_id, UserId::v4());
        let got = tier.retrieve(&other, MemoryScope::Session, "draft").await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn search_filters_by_meta() {
        let tier = InMemoryTier::new(TierLimits::durable());
        let id = identity();
        tier.store(&id, MemoryScope::Kb, "a", json!("apple"), Some(json!({"kind": "fruit"})))
            .await
            .unwrap();
        tier.store(&id, MemoryScope::Kb, "b", json!("carrot"), Some(json!({"kind": "veg"})))
            .await
            .unwrap();
        let found = tier
            .search(&id, MemoryScope::Kb, "", 10, Some(&json!({"kind": "fruit"})))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key, "a");
    }

    #[tokio::test]
    async fn clear_with_prefix_removes_matching_only() {
        let tier = InMemoryTier::new(TierLimits::durable());
        let id = identity();
        tier.store(&id, MemoryScope::Session, "run:1", json!(1), None).await.unwrap();
        tier.store(&id, MemoryScope::Session, "run:2", json!(2), None).await.unwrap();
        tier.store(&id, MemoryScope::Session, "other", json!(3), None).await.unwrap();
        let removed = tier.clear(&id, MemoryScope::Session, Some("run:")).await.unwrap();
        assert_eq!(removed, 2);
        assert!(tier.retrieve(&id, MemoryScope::Session, "other").await.unwrap().is_some());
    }
}
