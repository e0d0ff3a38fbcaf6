//! # Tracing Setup
//!
//! Initializes the global subscriber once for the whole process.
//! `RUST_LOG=debug` shows per-order shelving and courier decisions;
//! the default `info` keeps one line per lifecycle event.

use tracing_subscriber::EnvFilter;

pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
