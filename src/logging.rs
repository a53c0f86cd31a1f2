//! Tracing subscriber setup for embedders
//!
//! The shell itself only emits `tracing` events; installing a subscriber is
//! the embedder's call. This helper wires up the common case: stderr output
//! filtered by `RUST_LOG`, defaulting to `info` for this crate.

use tracing_subscriber::EnvFilter;

/// Install a global stderr subscriber filtered by `RUST_LOG`.
///
/// Falls back to `atelier=info` when the variable is unset. Safe to call more
/// than once; later calls are no-ops.
pub fn init_from_env() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("atelier=info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    let _ = subscriber.try_init();
}
