//! Logging initialization.
//!
//! Structured logging goes to stderr: stdout is reserved for the JSON-RPC
//! channel when running as an MCP server.

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber.
///
/// Respects `RUST_LOG` when set; otherwise defaults to `info`, or `debug`
/// when verbose output was requested. Safe to call more than once.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
