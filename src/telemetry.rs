//! Tracing subscriber setup for binaries and tests.

use tracing_subscriber::{EnvFilter, fmt};

/// Initializes a global `tracing` subscriber with env-filter support.
///
/// Respects `RUST_LOG`; defaults to `info` for this crate when unset.
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("promograph=info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
