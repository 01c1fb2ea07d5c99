//! Shared plumbing for the CCL command-line tools.

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Initialize logging for CLI tools.
///
/// Respects `RUST_LOG`; defaults to info with debug output for the compiler
/// crates.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ccl_resolve=debug,ccl_parser=info"));

    fmt().with_env_filter(filter).with_target(false).init();
}
