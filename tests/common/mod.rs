//! Common test utilities for the integration suites.

use tracing_subscriber::EnvFilter;

/// Install a tracing subscriber so registry events show up in test
/// output. Safe to call from every test; only the first call wins.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
