//! `tracing::Span`-based instrumentation helpers for resilience patterns.

use std::marker::PhantomData;
use std::time::Duration;

use tracing::Span;

/// Creates a span for one execution of `operation` under `pattern`.
#[must_use]
pub fn create_span(pattern: &str, operation: &str) -> Span {
    tracing::info_span!("resilience_operation", pattern = %pattern, operation = %operation)
}

/// Records a successful outcome and its duration on `span`.
pub fn record_success(span: &Span, duration: Duration) {
    span.record("succeeded", true);
    span.record("duration_ms", duration.as_millis() as u64);
}

/// Records a failed outcome and its error on `span`.
pub fn record_error(span: &Span, error: &(dyn std::error::Error + 'static)) {
    span.record("succeeded", false);
    span.record("error", tracing::field::display(error));
}

/// RAII guard that opens a span on construction and records the outcome when
/// consumed via [`Self::success`] or [`Self::failure`].
pub struct SpanGuard {
    span: Span,
    start: std::time::Instant,
}

impl SpanGuard {
    /// Opens a span for `operation` under `pattern`.
    #[must_use]
    pub fn new(pattern: &str, operation: &str) -> Self {
        Self { span: create_span(pattern, operation), start: std::time::Instant::now() }
    }

    /// Records success and elapsed duration, closing the guard.
    pub fn success(self) {
        record_success(&self.span, self.start.elapsed());
    }

    /// Records failure and elapsed duration, closing the guard.
    pub fn failure(self, error: &(dyn std::error::Error + 'static)) {
        record_error(&self.span, error);
    }
}

/// Marker trait identifying which pattern a [`PatternSpanGuard`] instruments.
pub trait PatternCategory: Send + Sync + 'static {
    /// The pattern name used as the span's `pattern` field.
    const NAME: &'static str;
}

/// [`PatternSpanGuard`] category for the retry pattern.
#[derive(Debug, Clone, Copy)]
pub struct RetryPattern;

impl PatternCategory for RetryPattern {
    const NAME: &'static str = "retry";
}

/// [`PatternSpanGuard`] category for the circuit breaker pattern.
#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerPattern;

impl PatternCategory for CircuitBreakerPattern {
    const NAME: &'static str = "circuit_breaker";
}

/// Type-parameterized variant of [`SpanGuard`] that gets its pattern name from
/// `P` instead of a runtime string.
pub struct PatternSpanGuard<P: PatternCategory> {
    inner: SpanGuard,
    _category: PhantomData<P>,
}

impl<P: PatternCategory> PatternSpanGuard<P> {
    /// Opens a span for `operation` under this guard's pattern category.
    #[must_use]
    pub fn new(operation: &str) -> Self {
        Self { inner: SpanGuard::new(P::NAME, operation), _category: PhantomData }
    }

    /// Records success and elapsed duration, closing the guard.
    pub fn success(self) {
        self.inner.success();
    }

    /// Records failure and elapsed duration, closing the guard.
    pub fn failure(self, error: &(dyn std::error::Error + 'static)) {
        self.inner.failure(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_guard_success_does_not_panic() {
        let guard = SpanGuard::new("retry", "fetch");
        guard.success();
    }

    #[test]
    fn pattern_span_guard_uses_category_name() {
        let guard = PatternSpanGuard::<RetryPattern>::new("fetch");
        guard.success();
    }
}
