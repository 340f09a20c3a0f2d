//! # nebula-log
//!
//! Thin `tracing`/`tracing-subscriber` initialization shared by every
//! Nebula binary and integration test: one [`Config`], one
//! [`LoggerBuilder`], one call to set up the global subscriber.
//!
//! ```rust,no_run
//! fn main() {
//!     let _guard = nebula_log::init().expect("logger init");
//!     tracing::info!("nebula starting up");
//! }
//! ```

pub mod builder;
pub mod config;
pub mod core;
mod format;
pub mod layer;
#[macro_use]
mod macros;
pub mod prelude;
pub mod writer;

pub use builder::{LoggerBuilder, LoggerGuard, ReloadHandle};
pub use config::{Config, DisplayConfig, Fields, Format, WriterConfig};
pub use core::{LogError, LogResult};
pub use layer::context::Context;

// Re-exported so callers can `use nebula_log::{trace, debug, info, warn,
// error};` without an extra `tracing` dependency of their own.
pub use tracing::{debug, error, info, trace, warn};

/// Initialize the global subscriber from `NEBULA_LOG`/`RUST_LOG` and the
/// other `NEBULA_LOG_*`/`NEBULA_*` environment variables (see
/// [`Config::from_env`]).
///
/// # Errors
///
/// Returns an error if the filter directive is invalid or the configured
/// writer could not be initialized.
pub fn init() -> LogResult<LoggerGuard> {
    init_with(Config::from_env())
}

/// Initialize the global subscriber from an explicit [`Config`].
///
/// # Errors
///
/// Returns an error if the filter directive is invalid or the configured
/// writer could not be initialized.
pub fn init_with(config: Config) -> LogResult<LoggerGuard> {
    LoggerBuilder::from_config(config).build()
}

/// Initialize the global subscriber with [`Config::development`] in debug
/// builds and [`Config::from_env`] (effectively [`Config::production`]-like
/// defaults) in release builds.
///
/// # Errors
///
/// Returns an error if the filter directive is invalid or the configured
/// writer could not be initialized.
pub fn auto_init() -> LogResult<LoggerGuard> {
    if cfg!(debug_assertions) {
        init_with(Config::development())
    } else {
        init()
    }
}
