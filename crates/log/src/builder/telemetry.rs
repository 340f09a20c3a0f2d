//! Sentry attachment and `log`-crate bridging.
//!
//! Both are genuinely optional side effects of [`LoggerBuilder::build`], so
//! they're kept behind their own feature flags rather than folded into the
//! main `build()` match on [`Format`](crate::config::Format).

/// Attach the Sentry tracing layer to `$subscriber` when the `sentry`
/// feature is enabled; a transparent passthrough otherwise, so
/// `init_subscriber!` doesn't need two code paths.
#[cfg(feature = "sentry")]
macro_rules! attach_sentry {
    ($subscriber:expr) => {
        $subscriber.with(sentry_tracing::layer())
    };
}

#[cfg(not(feature = "sentry"))]
macro_rules! attach_sentry {
    ($subscriber:expr) => {
        $subscriber
    };
}

/// Initialize Sentry (if `SENTRY_DSN` is set) and bridge the `log` crate
/// into `tracing` (if the `log-compat` feature is enabled).
pub(super) fn init_telemetry(inner: &mut super::Inner) {
    #[cfg(feature = "sentry")]
    {
        if let Ok(dsn) = std::env::var("SENTRY_DSN") {
            let guard = sentry::init((
                dsn,
                sentry::ClientOptions {
                    release: sentry::release_name!(),
                    ..Default::default()
                },
            ));
            inner.sentry_guard = Some(guard);
        }
    }
    #[cfg(not(feature = "sentry"))]
    {
        let _ = &inner;
    }

    #[cfg(feature = "log-compat")]
    {
        // Best-effort: only fails if a `log` logger was already installed,
        // which just means something else got there first.
        let _ = tracing_log::LogTracer::init();
    }
}
