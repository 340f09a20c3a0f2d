//! Type-safe builder for [`DynamicConfig`], validating required fields before
//! they're written into the underlying JSON map.

use std::time::Duration;

use super::DynamicConfig;
use crate::core::config::{ConfigError, ConfigResult};

/// Entry point for building a [`DynamicConfig`] one pattern section at a time.
#[derive(Debug, Clone, Default)]
pub struct DynamicConfigBuilder {
    config: DynamicConfig,
}

impl DynamicConfigBuilder {
    /// Starts a new, empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts building the `retry.*` section.
    #[must_use]
    pub fn retry(self) -> RetryConfigBuilder {
        RetryConfigBuilder { parent: self, max_attempts: None, base_delay: None }
    }

    /// Starts building the `circuit_breaker.*` section.
    #[must_use]
    pub fn circuit_breaker(self) -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder {
            parent: self,
            failure_threshold: None,
            reset_timeout: None,
            half_open_max_operations: None,
        }
    }

    /// Starts building the `bulkhead.*` section.
    #[must_use]
    pub fn bulkhead(self) -> BulkheadConfigBuilder {
        BulkheadConfigBuilder { parent: self, max_concurrency: None, queue_size: None, timeout: None }
    }

    /// Finishes building, returning the assembled configuration.
    #[must_use]
    pub fn build(self) -> DynamicConfig {
        self.config
    }
}

/// Sub-builder for the `retry.*` section of a [`DynamicConfigBuilder`].
pub struct RetryConfigBuilder {
    parent: DynamicConfigBuilder,
    max_attempts: Option<usize>,
    base_delay: Option<Duration>,
}

impl RetryConfigBuilder {
    /// Sets the maximum number of attempts (must be greater than zero).
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Sets the base delay between attempts.
    #[must_use]
    pub fn base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = Some(base_delay);
        self
    }

    /// Validates the section and writes it into the parent configuration.
    pub fn done(self) -> ConfigResult<DynamicConfigBuilder> {
        let max_attempts =
            self.max_attempts.ok_or_else(|| ConfigError::validation("retry.max_attempts is required"))?;
        let base_delay =
            self.base_delay.ok_or_else(|| ConfigError::validation("retry.base_delay is required"))?;
        if max_attempts == 0 {
            return Err(ConfigError::validation("retry.max_attempts must be greater than zero"));
        }

        let mut parent = self.parent;
        parent.config.set_value("retry.max_attempts", serde_json::json!(max_attempts))?;
        parent.config.set_value("retry.base_delay_ms", serde_json::json!(base_delay.as_millis() as u64))?;
        Ok(parent)
    }
}

/// Sub-builder for the `circuit_breaker.*` section of a [`DynamicConfigBuilder`].
pub struct CircuitBreakerConfigBuilder {
    parent: DynamicConfigBuilder,
    failure_threshold: Option<u32>,
    reset_timeout: Option<Duration>,
    half_open_max_operations: Option<usize>,
}

impl CircuitBreakerConfigBuilder {
    /// Sets the number of failures required to open the circuit.
    #[must_use]
    pub fn failure_threshold(mut self, failure_threshold: u32) -> Self {
        self.failure_threshold = Some(failure_threshold);
        self
    }

    /// Sets how long the circuit stays open before probing again.
    #[must_use]
    pub fn reset_timeout(mut self, reset_timeout: Duration) -> Self {
        self.reset_timeout = Some(reset_timeout);
        self
    }

    /// Sets the number of probe operations allowed while half-open.
    #[must_use]
    pub fn half_open_max_operations(mut self, half_open_max_operations: usize) -> Self {
        self.half_open_max_operations = Some(half_open_max_operations);
        self
    }

    /// Validates the section and writes it into the parent configuration.
    pub fn done(self) -> ConfigResult<DynamicConfigBuilder> {
        let failure_threshold = self
            .failure_threshold
            .ok_or_else(|| ConfigError::validation("circuit_breaker.failure_threshold is required"))?;
        let reset_timeout = self
            .reset_timeout
            .ok_or_else(|| ConfigError::validation("circuit_breaker.reset_timeout is required"))?;
        let half_open_max_operations = self.half_open_max_operations.unwrap_or(1);

        let mut parent = self.parent;
        parent.config.set_value("circuit_breaker.failure_threshold", serde_json::json!(failure_threshold))?;
        parent.config.set_value(
            "circuit_breaker.reset_timeout_ms",
            serde_json::json!(reset_timeout.as_millis() as u64),
        )?;
        parent.config.set_value(
            "circuit_breaker.half_open_max_operations",
            serde_json::json!(half_open_max_operations),
        )?;
        Ok(parent)
    }
}

/// Sub-builder for the `bulkhead.*` section of a [`DynamicConfigBuilder`].
pub struct BulkheadConfigBuilder {
    parent: DynamicConfigBuilder,
    max_concurrency: Option<usize>,
    queue_size: Option<usize>,
    timeout: Option<Duration>,
}

impl BulkheadConfigBuilder {
    /// Sets the maximum number of concurrent operations.
    #[must_use]
    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = Some(max_concurrency);
        self
    }

    /// Sets how many operations may wait for a slot before being rejected.
    #[must_use]
    pub fn queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = Some(queue_size);
        self
    }

    /// Sets how long a queued operation waits for a slot before timing out.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validates the section and writes it into the parent configuration.
    pub fn done(self) -> ConfigResult<DynamicConfigBuilder> {
        let max_concurrency = self
            .max_concurrency
            .ok_or_else(|| ConfigError::validation("bulkhead.max_concurrency is required"))?;
        let timeout =
            self.timeout.ok_or_else(|| ConfigError::validation("bulkhead.timeout is required"))?;
        let queue_size = self.queue_size.unwrap_or(0);

        let mut parent = self.parent;
        parent.config.set_value("bulkhead.max_concurrency", serde_json::json!(max_concurrency))?;
        parent.config.set_value("bulkhead.queue_size", serde_json::json!(queue_size))?;
        parent.config.set_value("bulkhead.timeout_ms", serde_json::json!(timeout.as_millis() as u64))?;
        Ok(parent)
    }
}
