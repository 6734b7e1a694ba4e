//! Stderr diagnostics for plugin binaries.
//!
//! Stdout carries the single protocol document, so every log line goes to
//! stderr. `RUST_LOG` selects verbosity; without it only warnings and errors
//! are shown so the orchestrator's build log stays quiet.

use tracing_subscriber::EnvFilter;

/// Install the global stderr subscriber. Later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .try_init();
}
