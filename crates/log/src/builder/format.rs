//! Format layer construction macros.
//!
//! Pulled into its own module (and brought into scope via `#[macro_use]`)
//! to avoid repeating the same `tracing_subscriber::fmt::layer()` builder
//! chain for each of [`Format`](crate::config::Format)'s variants in
//! `LoggerBuilder::build`.

/// Build a pretty or compact format layer from shared display config.
macro_rules! create_fmt_layer {
    (pretty, $display:expr, $writer:expr) => {{
        let display: &$crate::config::DisplayConfig = $display;
        tracing_subscriber::fmt::layer()
            .pretty()
            .with_ansi(display.colors)
            .with_target(display.target)
            .with_file(display.source)
            .with_line_number(display.source)
            .with_timer($crate::format::make_timer(None))
            .with_writer($writer)
    }};
    (compact, $display:expr, $writer:expr) => {{
        let display: &$crate::config::DisplayConfig = $display;
        tracing_subscriber::fmt::layer()
            .compact()
            .with_ansi(display.colors)
            .with_target(display.target)
            .with_file(display.source)
            .with_line_number(display.source)
            .with_timer($crate::format::make_timer(None))
            .with_writer($writer)
    }};
}

/// Build a newline-delimited JSON format layer from shared display config.
macro_rules! create_json_layer {
    ($display:expr, $writer:expr) => {{
        let display: &$crate::config::DisplayConfig = $display;
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(display.flatten)
            .with_ansi(false)
            .with_target(display.target)
            .with_file(display.source)
            .with_line_number(display.source)
            .with_timer($crate::format::make_timer(None))
            .with_writer($writer)
    }};
}
