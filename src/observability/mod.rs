//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! configurator / storage / http produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (update and storage counters)
//!
//! Consumers:
//!     → stdout (fmt layer, filtered by RUST_LOG)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Every configuration event carries `root` and `path` fields
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
