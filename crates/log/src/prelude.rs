//! `use nebula_log::prelude::*;` for the macros and types call sites reach
//! for most often.

pub use tracing::{Level, debug, error, info, instrument, trace, warn};

pub use crate::config::{Config, Format};
pub use crate::{Context, LogError, LogResult, LoggerGuard};
