//! Vector contract implemented by the semantic tier.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::MemoryError;
use crate::identity::{MemoryIdentity, MemoryScope};

/// A vector index scoped by caller identity, alongside the textual
/// [`crate::store::MemoryStore`] contract the same tier also implements.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Attach (or replace) the embedding for `key`.
    ///
    /// Returns [`MemoryError::DimensionMismatch`] if `vector.len()` doesn't
    /// match the index's configured dimension.
    async fn upsert(
        &self,
        identity: &MemoryIdentity,
        scope: MemoryScope,
        key: &str,
        vector: Vec<f32>,
        model_version: &str,
    ) -> Result<(), MemoryError>;

    /// Return up to `k` `(key, cosine_similarity)` pairs nearest `vector`,
    /// most similar first, narrowed by `filter` (meta-field equalities) and
    /// restricted to the caller's identity/scope slice. Ties break by key
    /// ascending so results are deterministic across runs.
    async fn query(
        &self,
        identity: &MemoryIdentity,
        scope: MemoryScope,
        vector: &[f32],
        k: usize,
        filter: Option<&Value>,
    ) -> Result<Vec<(String, f32)>, MemoryError>;
}

/// Cosine similarity between two equal-length vectors. `0.0` if either has
/// zero magnitude, matching the convention of treating a null vector as
/// maximally dissimilar rather than propagating NaN.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
