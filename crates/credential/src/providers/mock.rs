//! In-memory storage provider for tests and examples.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::{CredentialContext, CredentialFilter, CredentialId, CredentialMetadata, StorageError};
use crate::traits::StorageProvider;
use crate::utils::EncryptedData;

/// Thread-safe in-memory [`StorageProvider`], with one-shot error injection
/// for exercising failure paths in tests.
#[derive(Clone, Debug, Default)]
pub struct MockStorageProvider {
    entries: Arc<RwLock<HashMap<CredentialId, (EncryptedData, CredentialMetadata)>>>,
    fail_next: Arc<RwLock<Option<StorageError>>>,
}

impl MockStorageProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next storage operation return `error` instead of running.
    pub async fn fail_next_with(&self, error: StorageError) {
        *self.fail_next.write().await = Some(error);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn take_injected_failure(&self) -> Result<(), StorageError> {
        match self.fail_next.write().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StorageProvider for MockStorageProvider {
    async fn store(
        &self,
        id: &CredentialId,
        data: EncryptedData,
        metadata: CredentialMetadata,
        _context: &CredentialContext,
    ) -> Result<(), StorageError> {
        self.take_injected_failure().await?;
        self.entries.write().await.insert(id.clone(), (data, metadata));
        Ok(())
    }

    async fn retrieve(
        &self,
        id: &CredentialId,
        _context: &CredentialContext,
    ) -> Result<(EncryptedData, CredentialMetadata), StorageError> {
        self.take_injected_failure().await?;
        self.entries
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound { id: id.to_string() })
    }

    async fn delete(&self, id: &CredentialId, _context: &CredentialContext) -> Result<(), StorageError> {
        self.take_injected_failure().await?;
        self.entries.write().await.remove(id);
        Ok(())
    }

    async fn list(
        &self,
        filter: Option<&CredentialFilter>,
        _context: &CredentialContext,
    ) -> Result<Vec<CredentialId>, StorageError> {
        self.take_injected_failure().await?;
        let entries = self.entries.read().await;
        let mut ids: Vec<CredentialId> = entries.keys().cloned().collect();

        if let Some(filter) = filter {
            ids.retain(|id| entries.get(id).is_some_and(|(_, metadata)| filter.matches(metadata)));
        }

        Ok(ids)
    }

    async fn exists(&self, id: &CredentialId, _context: &CredentialContext) -> Result<bool, StorageError> {
        self.take_injected_failure().await?;
        Ok(self.entries.read().await.contains_key(id))
    }
}
