//! Logger configuration types.
//!
//! [`Config`] is the single value [`crate::init_with`] needs; the `presets`
//! module adds the `development()` / `production()` / `from_env()`
//! constructors on top of the plain struct defined here.

mod presets;

use serde::{Deserialize, Serialize};

#[cfg(feature = "file")]
use std::path::PathBuf;

/// Top-level logger configuration consumed by [`crate::LoggerBuilder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// `tracing_subscriber::EnvFilter` directive string, e.g.
    /// `"info,nebula_engine=debug"`.
    pub level: String,
    /// Output rendering.
    pub format: Format,
    /// Cosmetic toggles for the human-readable formats.
    pub display: DisplayConfig,
    /// Global fields attached to every event via a root span.
    pub fields: Fields,
    /// Where events are written.
    pub writer: WriterConfig,
    /// Wrap the filter in a `reload::Layer` so [`crate::ReloadHandle::reload`]
    /// can change it at runtime.
    pub reloadable: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Compact,
            display: DisplayConfig::default(),
            fields: Fields::default(),
            writer: WriterConfig::default(),
            reloadable: false,
        }
    }
}

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    /// Multi-line, human-friendly, for local development.
    Pretty,
    /// Single-line, human-friendly.
    Compact,
    /// `key=value` pairs on a single line (handled the same as `Compact` by
    /// the current formatter, kept distinct so config files can opt in to a
    /// dedicated logfmt renderer later without a breaking enum change).
    Logfmt,
    /// Newline-delimited JSON, for log aggregators.
    Json,
}

/// Cosmetic toggles shared by the pretty/compact/json format layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// ANSI color codes (ignored for JSON output).
    pub colors: bool,
    /// Include file name + line number.
    pub source: bool,
    /// Include a timestamp on every event.
    pub time: bool,
    /// Flatten span fields into the event object instead of nesting them
    /// under `"spans"` (JSON format only).
    pub flatten: bool,
    /// Include the `tracing` target (module path) on every event.
    pub target: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            colors: true,
            source: false,
            time: true,
            flatten: false,
            target: true,
        }
    }
}

impl DisplayConfig {
    /// Override the defaults with `NEBULA_LOG_COLORS` / `NEBULA_LOG_SOURCE` /
    /// `NEBULA_LOG_TIME`, when set. Unset or unparseable values leave the
    /// current value untouched.
    pub fn parse_env(&mut self) {
        if let Ok(v) = std::env::var("NEBULA_LOG_COLORS") {
            self.colors = parse_bool(&v, self.colors);
        }
        if let Ok(v) = std::env::var("NEBULA_LOG_SOURCE") {
            self.source = parse_bool(&v, self.source);
        }
        if let Ok(v) = std::env::var("NEBULA_LOG_TIME") {
            self.time = parse_bool(&v, self.time);
        }
    }
}

fn parse_bool(raw: &str, default: bool) -> bool {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Global fields attached to every event via a root span created in
/// [`crate::LoggerBuilder::build`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fields {
    pub service: Option<String>,
    pub env: Option<String>,
    pub version: Option<String>,
    pub instance: Option<String>,
    pub region: Option<String>,
}

impl Fields {
    /// True when none of the fields are set — the root span is skipped in
    /// this case so `tracing`'s event formatting sees one less span level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.service.is_none()
            && self.env.is_none()
            && self.version.is_none()
            && self.instance.is_none()
            && self.region.is_none()
    }

    /// Populate from `NEBULA_SERVICE` / `NEBULA_ENV` / `NEBULA_VERSION` /
    /// `NEBULA_INSTANCE` / `NEBULA_REGION`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            service: std::env::var("NEBULA_SERVICE").ok(),
            env: std::env::var("NEBULA_ENV").ok(),
            version: std::env::var("NEBULA_VERSION").ok(),
            instance: std::env::var("NEBULA_INSTANCE").ok(),
            region: std::env::var("NEBULA_REGION").ok(),
        }
    }
}

/// Where log output is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WriterConfig {
    Stdout,
    Stderr,
    /// Daily-rotating file sink, written through a non-blocking writer.
    #[cfg(feature = "file")]
    File {
        directory: PathBuf,
        file_name_prefix: String,
    },
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self::Stdout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_empty_by_default() {
        assert!(Fields::default().is_empty());
    }

    #[test]
    fn fields_not_empty_with_service() {
        let fields = Fields {
            service: Some("nebula-engine".to_string()),
            ..Default::default()
        };
        assert!(!fields.is_empty());
    }

    #[test]
    fn parse_bool_keeps_default_on_garbage() {
        assert!(parse_bool("banana", true));
        assert!(!parse_bool("banana", false));
        assert!(!parse_bool("off", true));
        assert!(parse_bool("1", false));
    }
}
