//! Minimal logger setup: init from config, log through the prelude macros,
//! and stash request-scoped fields with `with_context!`.

use nebula_log::prelude::*;
use nebula_log::with_context;

fn main() -> anyhow::Result<()> {
    let _guard = nebula_log::init_with(Config::development())?;

    info!("starting up");

    let ctx = with_context!(request_id = "req-123", user_id = "user-456");
    ctx.scope_sync(|| {
        info!("handling request");
        warn!(retry = 2, "upstream slow, retrying");
    });

    Ok(())
}
