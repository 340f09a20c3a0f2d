//! Wiring Sentry into the logger.
//!
//! Run with `SENTRY_DSN=... cargo run --example sentry_setup --features sentry`.
//! Without a DSN set, [`nebula_log::init`] still succeeds — Sentry is
//! simply left uninitialized.

use nebula_log::prelude::*;

fn main() -> anyhow::Result<()> {
    let _guard = nebula_log::init_with(Config::production())?;

    info!("service starting");
    error!(code = 500, "simulated failure reported to sentry, if configured");

    Ok(())
}
