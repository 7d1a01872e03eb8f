//! Tracing initialization.
//!
//! The engine logs structured events (request ids, supplier kinds, selection
//! reasons); secrets never reach the log layer because credential types
//! redact themselves. Filtering is driven by `RUST_LOG`, defaulting to
//! `info`.

use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// JSON logs with timestamps, for deployments that ship logs somewhere.
pub fn init_json() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

/// Human-readable logs for local runs and debugging.
pub fn init_pretty() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .try_init();
}
