//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Log level taken from `RUST_LOG`, falling back to the given default

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter used by both binaries.
pub const DEFAULT_FILTER: &str = "confgate=debug,tower_http=debug";

/// Install the global subscriber. Safe to call more than once; later calls are ignored.
pub fn init(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
