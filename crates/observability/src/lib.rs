//! Process-wide logging setup shared by binaries and workers.

pub mod tracing;

/// Initialize tracing for the process with the default (JSON) output.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init_json();
}
