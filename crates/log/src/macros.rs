//! Convenience macros for structured logging.

/// Log an error at `error` level and return it unchanged — for the common
/// `let e = fallible()?;` sites where you want the error logged exactly
/// once, at the point it's generated, rather than re-logged by every layer
/// it bubbles through.
#[macro_export]
macro_rules! log_error {
    ($err:expr) => {{
        let e = $err;
        tracing::error!(error = ?e);
        e
    }};
    ($err:expr, $($arg:tt)*) => {{
        let e = $err;
        tracing::error!(error = ?e, $($arg)*);
        e
    }};
}

/// Build a request-scoped [`Context`](crate::Context) with additional
/// fields.
///
/// Returns a `Context` — use `.scope(future)` or `.scope_sync(closure)` to
/// activate it.
///
/// ```rust,ignore
/// let ctx = with_context!(request_id = "req-123", user_id = "user-456");
/// ctx.scope(async { /* context active here */ }).await;
/// ```
#[macro_export]
macro_rules! with_context {
    ($($key:ident = $value:expr),* $(,)?) => {{
        (*$crate::Context::current()).clone()
            $(.with_field(stringify!($key), $value))*
    }};
}
