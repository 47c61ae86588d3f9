//! Node bootstrap: initial configuration file and hot reload.
//!
//! # Data Flow
//! ```text
//! Startup (loader.rs):
//!     --config file (.json / .conf / .hocon / .toml) → {root: data} map
//!         → modules::build_registry
//!
//! Reload (watcher.rs):
//!     file modified → loader → channel → Registry::apply
//! ```
//!
//! # Design Decisions
//! - A reload goes through the same validated path as a REST update
//! - A reload that fails to parse or validate is logged and dropped; the
//!   running configuration is kept

pub mod loader;
pub mod watcher;

pub use loader::{load_bootstrap, parse_bootstrap, BootstrapError};
pub use watcher::{apply_reloads, ConfigWatcher};
