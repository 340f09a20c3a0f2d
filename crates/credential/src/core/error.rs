//! Error types shared across credential storage, validation, and management.

use thiserror::Error;

/// Errors raised while constructing or validating credential identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("credential id cannot be empty")]
    EmptyCredentialId,
    #[error("invalid credential id {id:?}: {reason}")]
    InvalidCredentialId { id: String, reason: String },
}

/// Errors raised by encryption, decryption, and key derivation.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("encryption failed")]
    EncryptionFailed,
    #[error("decryption failed")]
    DecryptionFailed,
    #[error("key derivation failed: {0}")]
    KeyDerivationFailed(String),
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
}

/// Errors raised by a [`crate::traits::StorageProvider`] implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("credential {id} not found")]
    NotFound { id: String },
    #[error("permission denied for credential {id}")]
    PermissionDenied { id: String },
    #[error("failed to read credential {id}: {source}")]
    ReadFailure {
        id: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write credential {id}: {source}")]
    WriteFailure {
        id: String,
        #[source]
        source: std::io::Error,
    },
    #[error("encrypted payload for {id} exceeds maximum size ({actual} > {max} bytes, provider {provider})")]
    PayloadTooLarge {
        id: String,
        actual: usize,
        max: usize,
        provider: String,
    },
    #[error("storage backend error for {id}: {reason}")]
    Backend { id: String, reason: String },
}

/// Errors raised by a credential's authentication flow (initialize, refresh, revoke).
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("initialization failed: {0}")]
    InitializationFailed(String),
    #[error("refresh failed: {0}")]
    RefreshFailed(String),
    #[error("revocation failed: {0}")]
    RevocationFailed(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error("provider error: {0}")]
    Provider(String),
}

/// Errors surfaced by [`crate::manager::CredentialManager`].
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("credential {credential_id} not found")]
    NotFound { credential_id: String },
    #[error("operation {operation} requires a scope")]
    ScopeRequired { operation: String },
    #[error("storage operation failed for {credential_id}: {source}")]
    StorageError {
        credential_id: String,
        #[source]
        source: StorageError,
    },
    #[error("validation failed for {credential_id}: {reason}")]
    ValidationError { credential_id: String, reason: String },
}

impl From<StorageError> for ManagerError {
    fn from(source: StorageError) -> Self {
        let credential_id = match &source {
            StorageError::NotFound { id }
            | StorageError::PermissionDenied { id }
            | StorageError::ReadFailure { id, .. }
            | StorageError::WriteFailure { id, .. }
            | StorageError::PayloadTooLarge { id, .. }
            | StorageError::Backend { id, .. } => id.clone(),
        };
        ManagerError::StorageError { credential_id, source }
    }
}

/// Result alias for [`ManagerError`].
pub type ManagerResult<T> = std::result::Result<T, ManagerError>;

/// Result alias for [`CredentialError`].
pub type Result<T> = std::result::Result<T, CredentialError>;
