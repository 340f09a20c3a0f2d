//! Core types shared by every resilience pattern: errors, configuration,
//! cancellation, and metric traits.

pub mod cancellation;
pub mod config;
pub mod dynamic;
mod error;
pub mod result;
pub mod traits;

pub use cancellation::CancellationContext;
pub use config::{ConfigError, ConfigResult, ResilienceConfig};
pub use error::{ErrorClass, ResilienceError};
pub use result::{ResilienceResult, ResultExt};
pub use traits::{MetricValue, PatternMetrics};
