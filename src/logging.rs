//! Tracing setup for the binaries.
//!
//! The library only emits `tracing` events; each binary decides where
//! they go. `RUST_LOG` overrides the default `info` filter.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Log to stdout. Returns `false` if a global subscriber was already set.
pub fn init() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}

/// Log to stderr, and only when `RUST_LOG` is set explicitly.
///
/// The terminal UI owns stdout/the alternate screen, so it stays quiet
/// unless asked (`RUST_LOG=debug sales-dashboard 2> dashboard.log`).
pub fn init_quiet() -> bool {
    if std::env::var_os("RUST_LOG").is_none() {
        return false;
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .is_ok()
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
