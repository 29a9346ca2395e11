//! Logging bootstrap.
//!
//! Installs the global tracing subscriber used by the CLI and examples.
//! The filter comes from `RUST_LOG` when set, otherwise from the provided
//! default directives.

use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

/// Initialize logging at `info` level.
pub fn init() {
    init_with_default_filter("info");
}

/// Initialize logging with explicit default filter directives.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_with_default_filter(directives: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(LocalTime::rfc_3339())
        .try_init();
}
