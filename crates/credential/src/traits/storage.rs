//! Storage provider abstraction for credential persistence.

use async_trait::async_trait;
use serde_json::Value;

use crate::core::{CredentialContext, CredentialError, CredentialFilter, CredentialId, CredentialMetadata, StorageError};
use crate::utils::EncryptedData;

/// Opaque version token for compare-and-swap writes against [`StateStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateVersion(pub u64);

/// Generic versioned key-value state storage, used by rotation transactions
/// to persist their progress independently of credential storage.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Loads state by id along with its current version.
    async fn load(&self, id: &str) -> Result<(Value, StateVersion), CredentialError>;

    /// Saves state for `id`, succeeding only if `version` is still current.
    async fn save(&self, id: &str, version: StateVersion, state: &Value) -> Result<StateVersion, CredentialError>;

    /// Deletes state by id.
    async fn delete(&self, id: &str) -> Result<(), CredentialError>;

    /// Returns whether state exists for `id`.
    async fn exists(&self, id: &str) -> Result<bool, CredentialError>;

    /// Lists all stored ids.
    async fn list(&self) -> Result<Vec<String>, CredentialError>;
}

/// Pluggable backend for encrypted credential persistence (local filesystem,
/// cloud secret managers, HashiCorp Vault).
///
/// All implementations must be `Send + Sync` to allow sharing across tasks.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Stores encrypted credential data and metadata, overwriting any
    /// existing entry for `id`.
    async fn store(
        &self,
        id: &CredentialId,
        data: EncryptedData,
        metadata: CredentialMetadata,
        context: &CredentialContext,
    ) -> Result<(), StorageError>;

    /// Retrieves encrypted data and metadata for `id`.
    async fn retrieve(
        &self,
        id: &CredentialId,
        context: &CredentialContext,
    ) -> Result<(EncryptedData, CredentialMetadata), StorageError>;

    /// Deletes `id`. Idempotent: deleting a non-existent credential succeeds.
    async fn delete(&self, id: &CredentialId, context: &CredentialContext) -> Result<(), StorageError>;

    /// Lists stored credential ids, optionally narrowed by `filter`.
    async fn list(
        &self,
        filter: Option<&CredentialFilter>,
        context: &CredentialContext,
    ) -> Result<Vec<CredentialId>, StorageError>;

    /// Returns whether `id` exists.
    async fn exists(&self, id: &CredentialId, context: &CredentialContext) -> Result<bool, StorageError>;
}
