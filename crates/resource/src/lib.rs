#![allow(clippy::excessive_nesting)]

//! # Nebula Resource Management
//!
//! Resource lifecycle management for the Nebula workflow engine.
//! Provides pooling, scoping, health checks, and credential injection for
//! resources acquired within a workflow execution — the backing scope model
//! the sandbox and memory subsystems key their own RBAC/tenancy scoping off.

pub mod context;
pub mod credentials;
pub mod error;
pub mod guard;
pub mod health;
pub mod manager;
pub mod pool;
pub mod resource;
pub mod scope;

// Re-exports
pub use context::Context;
pub use credentials::{CredentialProvider, SecureString};
pub use error::{Error as ResourceError, Result as ResourceResult};
pub use guard::Guard;
pub use health::{HealthCheckConfig, HealthCheckable, HealthChecker, HealthState, HealthStatus};
pub use manager::{AnyGuard, AnyGuardTrait, DependencyGraph, Manager};
pub use pool::{Pool, PoolConfig, PoolStats};
pub use resource::{Config, Resource};
pub use scope::{Scope, Strategy};
