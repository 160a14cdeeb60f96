//! Logging setup.
//!
//! `RUST_LOG` wins when set; otherwise the configured filter applies.

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// Returns `false` if a subscriber was already installed (e.g. by a test
/// harness), in which case the existing one stays active.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
