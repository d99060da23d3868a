//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter, e.g. `DIAGNET_LOG=diagnet=debug,tower_http=info`
pub const LOG_VAR: &str = "DIAGNET_LOG";

static INIT: Once = Once::new();

/// Install the global tracing subscriber.
///
/// Falls back to `info` if `DIAGNET_LOG` is not set or is invalid. Calling this more than once
/// is harmless.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_VAR)
            .unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .init();
    });
}
