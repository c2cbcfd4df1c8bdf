//! Tracing subscriber setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV: &str = "TIMEGRID_LOG";

/// Install a fmt subscriber filtered by `TIMEGRID_LOG`, or `fallback_filter`
/// when the variable is unset or unparsable.
///
/// Returns `false` when a global subscriber was already installed, which
/// happens routinely in tests.
pub fn init_tracing(fallback_filter: &str) -> bool {
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback_filter));

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(fallback_filter, "Tracing initialized");
    }
    installed
}
