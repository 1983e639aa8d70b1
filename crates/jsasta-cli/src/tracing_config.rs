//! `tracing-subscriber` wiring gated by `-v`/`-q` and `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber. `verbose` drops the default filter to
/// `debug`; `quiet` raises it to `warn`; otherwise `RUST_LOG` (default
/// `info`) governs.
pub fn init(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).without_time().with_target(false).try_init();
}
