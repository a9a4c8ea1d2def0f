//! Logging setup backed by `tracing-subscriber`.
//!
//! The core library reports recoverable oddities (version fallbacks,
//! suspicious trailers) through `tracing` warnings; installing the
//! subscriber here is what makes them visible. `RUST_LOG` overrides the
//! CLI verbosity when set.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

pub fn init_logging(level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,dlis_core={level},dlis_cli={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
