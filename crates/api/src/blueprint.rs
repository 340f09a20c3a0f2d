//! Blueprint CRUD with optimistic-concurrency version locking — the
//! in-process equivalent of the out-of-scope HTTP surface's
//! `X-Version-Lock` header (sentinel `__new__` for create).

use async_trait::async_trait;
use dashmap::DashMap;
use nebula_core::id::WorkflowId;
use nebula_workflow::WorkflowDefinition;

use crate::error::ApiError;

/// Sentinel expected-version value a caller supplies to create a new
/// blueprint rather than update an existing one.
pub const NEW_BLUEPRINT: u64 = 0;

/// A stored blueprint plus the version lock its next update must supply.
#[derive(Debug, Clone)]
pub struct BlueprintRecord {
    /// The blueprint's identity.
    pub id: WorkflowId,
    /// Monotonically increasing version; starts at 1 on create.
    pub version_lock: u64,
    /// The blueprint itself.
    pub definition: WorkflowDefinition,
}

/// Storage port for blueprints, independent of the concrete backend.
#[async_trait]
pub trait BlueprintStore: Send + Sync {
    /// Create a new blueprint, or update an existing one if
    /// `expected_version` matches `id`'s current `version_lock`.
    /// `expected_version == `[`NEW_BLUEPRINT`] requires `id` not already
    /// exist.
    async fn put(
        &self,
        id: WorkflowId,
        expected_version: u64,
        definition: WorkflowDefinition,
    ) -> Result<BlueprintRecord, ApiError>;

    /// Fetch the current record for `id`.
    async fn get(&self, id: WorkflowId) -> Result<Option<BlueprintRecord>, ApiError>;

    /// Remove a blueprint. Returns whether it existed.
    async fn delete(&self, id: WorkflowId) -> Result<bool, ApiError>;
}

/// In-memory [`BlueprintStore`]. No durability across restarts — the same
/// posture `nebula-execution-inprocess` takes for execution state until a
/// real backend is wired behind the same trait.
#[derive(Default)]
pub struct InMemoryBlueprintStore {
    records: DashMap<WorkflowId, BlueprintRecord>,
}

impl InMemoryBlueprintStore {
    /// Construct an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlueprintStore for InMemoryBlueprintStore {
    async fn put(
        &self,
        id: WorkflowId,
        expected_version: u64,
        definition: WorkflowDefinition,
    ) -> Result<BlueprintRecord, ApiError> {
        let record = match self.records.get(&id) {
            Some(existing) => {
                if existing.version_lock != expected_version {
                    return Err(ApiError::VersionConflict {
                        id,
                        expected: expected_version,
                        actual: existing.version_lock,
                    });
                }
                BlueprintRecord {
                    id,
                    version_lock: existing.version_lock + 1,
                    definition,
                }
            }
            None => {
                if expected_version != NEW_BLUEPRINT {
                    return Err(ApiError::VersionConflict {
                        id,
                        expected: expected_version,
                        actual: NEW_BLUEPRINT,
                    });
                }
                BlueprintRecord {
                    id,
                    version_lock: 1,
                    definition,
                }
            }
        };
        self.records.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: WorkflowId) -> Result<Option<BlueprintRecord>, ApiError> {
        Ok(self.records.get(&id).map(|r| r.clone()))
    }

    async fn delete(&self, id: WorkflowId) -> Result<bool, ApiError> {
        Ok(self.records.remove(&id).is_some())
    }
}
