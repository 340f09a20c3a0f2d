//! Storage provider implementations for credential persistence.

pub mod config;
pub mod metrics;
mod mock;

#[cfg(feature = "storage-vault")]
pub mod vault;

pub use config::{ConfigError, ProviderConfig};
pub use metrics::StorageMetrics;
pub use mock::MockStorageProvider;

#[cfg(feature = "storage-vault")]
pub use vault::{HashiCorpVaultProvider, VaultAuthMethod, VaultConfig};
