//! Structured logging and metrics hooks, plus typed per-pattern events.

use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Log verbosity for [`LoggingHook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// `tracing::trace!`
    Trace,
    /// `tracing::debug!`
    Debug,
    /// `tracing::info!`
    Info,
    /// `tracing::warn!`
    Warn,
    /// `tracing::error!`
    Error,
}

/// One resilience-pattern execution: which pattern, which operation, how it went.
#[derive(Debug, Clone)]
pub struct PatternEvent {
    /// Pattern name, e.g. `"circuit_breaker"` or `"retry"`.
    pub pattern: String,
    /// Operation name the pattern was wrapping.
    pub operation: String,
    /// Whether the wrapped operation succeeded.
    pub succeeded: bool,
    /// How long the operation took.
    pub duration: Duration,
}

/// Receives every [`PatternEvent`] emitted by an instrumented pattern.
pub trait ObservabilityHook: Send + Sync {
    /// Called once per pattern execution.
    fn on_event(&self, event: &PatternEvent);
}

/// Ordered collection of [`ObservabilityHook`]s, all invoked on every event.
#[derive(Clone, Default)]
pub struct ObservabilityHooks {
    hooks: Vec<Arc<dyn ObservabilityHook>>,
}

impl ObservabilityHooks {
    /// Creates an empty hook set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `hook` to the set.
    #[must_use]
    pub fn with_hook(mut self, hook: impl ObservabilityHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Invokes every registered hook with `event`.
    pub fn notify(&self, event: &PatternEvent) {
        for hook in &self.hooks {
            hook.on_event(event);
        }
    }
}

impl std::fmt::Debug for ObservabilityHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservabilityHooks").field("hooks", &self.hooks.len()).finish()
    }
}

/// Logs every event via `tracing` at a configured [`LogLevel`].
#[derive(Debug, Clone, Copy)]
pub struct LoggingHook {
    level: LogLevel,
}

impl LoggingHook {
    /// Creates a hook that logs at `level`.
    #[must_use]
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }
}

impl ObservabilityHook for LoggingHook {
    fn on_event(&self, event: &PatternEvent) {
        let duration_ms = event.duration.as_millis();
        match self.level {
            LogLevel::Trace => tracing::trace!(pattern = %event.pattern, operation = %event.operation, succeeded = event.succeeded, duration_ms, "resilience event"),
            LogLevel::Debug => tracing::debug!(pattern = %event.pattern, operation = %event.operation, succeeded = event.succeeded, duration_ms, "resilience event"),
            LogLevel::Info => tracing::info!(pattern = %event.pattern, operation = %event.operation, succeeded = event.succeeded, duration_ms, "resilience event"),
            LogLevel::Warn => tracing::warn!(pattern = %event.pattern, operation = %event.operation, succeeded = event.succeeded, duration_ms, "resilience event"),
            LogLevel::Error => tracing::error!(pattern = %event.pattern, operation = %event.operation, succeeded = event.succeeded, duration_ms, "resilience event"),
        }
    }
}

/// Tracks aggregate success/failure counts across all observed events.
#[derive(Debug, Default)]
pub struct MetricsHook {
    successes: AtomicU64,
    failures: AtomicU64,
}

impl MetricsHook {
    /// Creates a hook with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total successful events observed so far.
    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    /// Total failed events observed so far.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

impl ObservabilityHook for MetricsHook {
    fn on_event(&self, event: &PatternEvent) {
        if event.succeeded {
            self.successes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Marker trait for compile-time event classification by pattern.
pub trait EventCategory: Send + Sync + 'static {
    /// The pattern name this category represents.
    const NAME: &'static str;
}

macro_rules! event_category {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl EventCategory for $name {
            const NAME: &'static str = $label;
        }
    };
}

event_category!(
    /// [`Event`] category for retry pattern executions.
    RetryEventCategory, "retry"
);
event_category!(
    /// [`Event`] category for circuit breaker executions.
    CircuitBreakerEventCategory, "circuit_breaker"
);
event_category!(
    /// [`Event`] category for bulkhead executions.
    BulkheadEventCategory, "bulkhead"
);
event_category!(
    /// [`Event`] category for rate limiter executions.
    RateLimiterEventCategory, "rate_limiter"
);
event_category!(
    /// [`Event`] category for timeout executions.
    TimeoutEventCategory, "timeout"
);

/// A named event tagged with a compile-time [`EventCategory`].
#[derive(Debug, Clone)]
pub struct Event<C: EventCategory> {
    /// Event name, typically the wrapped operation's name.
    pub name: String,
    /// How long the event took, if known.
    pub duration: Option<Duration>,
    _category: PhantomData<C>,
}

impl<C: EventCategory> Event<C> {
    /// Creates an event named `name` with no duration recorded yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), duration: None, _category: PhantomData }
    }

    /// Attaches a duration to this event.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Returns this event's category name.
    #[must_use]
    pub fn category(&self) -> &'static str {
        C::NAME
    }
}

/// A single exported metric sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    /// Metric name, e.g. `"latency"`.
    pub name: String,
    /// Pattern that produced the metric, e.g. `"circuit_breaker"`.
    pub pattern: String,
    /// Operation the metric is about, e.g. `"get"`.
    pub operation: String,
    /// The sampled value.
    pub value: f64,
}

/// Helpers for constructing [`Metric`] samples.
pub mod metrics {
    use super::Metric;

    /// Builds a histogram-style metric sample for `operation` on `pattern`.
    #[must_use]
    pub fn operation_histogram(name: &str, pattern: &str, operation: &str, value: f64) -> Metric {
        Metric {
            name: name.to_string(),
            pattern: pattern.to_string(),
            operation: operation.to_string(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_hook_counts_outcomes() {
        let hook = MetricsHook::new();
        hook.on_event(&PatternEvent {
            pattern: "retry".into(),
            operation: "get".into(),
            succeeded: true,
            duration: Duration::from_millis(10),
        });
        hook.on_event(&PatternEvent {
            pattern: "retry".into(),
            operation: "get".into(),
            succeeded: false,
            duration: Duration::from_millis(5),
        });

        assert_eq!(hook.successes(), 1);
        assert_eq!(hook.failures(), 1);
    }

    #[test]
    fn hooks_set_notifies_every_hook() {
        let hooks = ObservabilityHooks::new().with_hook(MetricsHook::new()).with_hook(MetricsHook::new());
        hooks.notify(&PatternEvent {
            pattern: "circuit_breaker".into(),
            operation: "call".into(),
            succeeded: true,
            duration: Duration::from_millis(1),
        });
    }

    #[test]
    fn typed_event_carries_category() {
        let event = Event::<RetryEventCategory>::new("api_call").with_duration(Duration::from_millis(100));
        assert_eq!(event.category(), "retry");
        assert_eq!(event.duration, Some(Duration::from_millis(100)));
    }

    #[test]
    fn metric_helper_builds_sample() {
        let metric = metrics::operation_histogram("latency", "circuit_breaker", "get", 50.0);
        assert_eq!(metric.value, 50.0);
        assert_eq!(metric.pattern, "circuit_breaker");
    }
}
