//! Node-level result cache (spec component C6's caching requirement).
//!
//! Keyed on a SHA-256 fingerprint of the node's identity, resolved input,
//! and kind-specific configuration, so two nodes (or two runs of the same
//! node) only ever share a cache entry when they would produce the same
//! output. Only actions the registry marks [`is_deterministic`] are ever
//! probed or populated — everything else always runs.
//!
//! [`is_deterministic`]: nebula_action::ActionMetadata::is_deterministic

use moka::future::Cache;
use nebula_workflow::NodeDefinition;
use sha2::{Digest, Sha256};

/// Async, bounded cache from fingerprint to a node's JSON output.
pub(crate) struct NodeCache {
    entries: Cache<String, serde_json::Value>,
}

impl NodeCache {
    /// `capacity` bounds the number of distinct fingerprints retained;
    /// moka evicts least-recently-used entries once it's exceeded.
    pub(crate) fn new(capacity: u64) -> Self {
        Self {
            entries: Cache::new(capacity),
        }
    }

    /// Fingerprint a node invocation: its id, resolved input, and kind
    /// (which carries its config — action id/params, prompt, condition
    /// expression, etc). Two invocations with the same fingerprint would
    /// execute identically.
    pub(crate) fn fingerprint(node: &NodeDefinition, resolved_input: &serde_json::Value) -> String {
        let mut hasher = Sha256::new();
        hasher.update(node.id.to_string().as_bytes());
        hasher.update(b"\0");
        hasher.update(resolved_input.to_string().as_bytes());
        hasher.update(b"\0");
        if let Ok(kind_json) = serde_json::to_string(&node.kind) {
            hasher.update(kind_json.as_bytes());
        }
        let digest = hasher.finalize();
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    pub(crate) async fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.entries.get(key).await
    }

    pub(crate) async fn put(&self, key: String, value: serde_json::Value) {
        self.entries.insert(key, value).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_core::id::ActionId;
    use nebula_workflow::NodeDefinition;
    use serde_json::json;

    fn tool_node(name: &str) -> NodeDefinition {
        NodeDefinition::new(nebula_core::id::NodeId::v4(), name, ActionId::v4())
    }

    #[test]
    fn same_node_and_input_fingerprint_identically() {
        let node = tool_node("a");
        let input = json!({"x": 1});
        assert_eq!(
            NodeCache::fingerprint(&node, &input),
            NodeCache::fingerprint(&node, &input)
        );
    }

    #[test]
    fn different_input_changes_fingerprint() {
        let node = tool_node("a");
        let fp1 = NodeCache::fingerprint(&node, &json!({"x": 1}));
        let fp2 = NodeCache::fingerprint(&node, &json!({"x": 2}));
        assert_ne!(fp1, fp2);
    }

    #[test]
    fn different_node_id_changes_fingerprint_even_with_same_input() {
        let a = tool_node("a");
        let b = tool_node("b");
        let input = json!({"x": 1});
        assert_ne!(
            NodeCache::fingerprint(&a, &input),
            NodeCache::fingerprint(&b, &input)
        );
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let cache = NodeCache::new(16);
        cache.put("key".into(), json!({"y": 2})).await;
        assert_eq!(cache.get("key").await, Some(json!({"y": 2})));
        assert_eq!(cache.get("missing").await, None);
    }
}
