//! Diagnostic logging setup.

use std::io;

use tracing_subscriber::EnvFilter;

/// Environment variable holding a log filter, e.g. `VAULT_LOG=vault_index=debug`.
pub const LOG_ENV: &str = "VAULT_LOG";

/// Installs the global subscriber.
///
/// Without `-v` the filter comes from [`LOG_ENV`] and defaults to `warn`. `-v` raises
/// every target to `info` and `-vv` to `debug`. Logs go to stderr so stdout stays
/// parseable.
pub fn init(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
