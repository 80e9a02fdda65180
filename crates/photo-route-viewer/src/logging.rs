//! Logging setup
//!
//! Installs a `tracing-subscriber` fmt layer filtered by `RUST_LOG`. When the
//! variable is unset a default is chosen per build profile; `--verbose` forces
//! debug output for this crate and the library.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Default filter when `RUST_LOG` is not set
fn default_directives() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn build_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("info,photo_route_lib=debug,photo_route_viewer=debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives()))
}

/// Initialize logging. Logs go to stderr so command output stays clean.
pub fn setup_logging(verbose: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(build_filter(verbose));
    let registry = tracing_subscriber::registry().with(fmt_layer);
    registry.init();

    tracing::debug!("Logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_filter() {
        let filter = build_filter(true).to_string();
        assert!(filter.contains("photo_route_lib=debug"));
    }
}
