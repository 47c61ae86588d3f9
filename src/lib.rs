//! Configuration management core of a node.
//!
//! Typed, path-addressable property trees per root, guarded by validators,
//! persisted through a pluggable storage and presented as JSON or HOCON.

// Core
pub mod error;
pub mod tree;
pub mod validation;
pub mod storage;
pub mod configurator;
pub mod presentation;
pub mod modules;

// Boundaries
pub mod http;
pub mod client;
pub mod node;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use configurator::{ConfigurationChange, Configurator, Registry};
pub use error::{ConfigError, ConfigResult};
pub use http::RestServer;
pub use lifecycle::Shutdown;
pub use presentation::{ConfigurationPresentation, Format};
pub use tree::{ConfigurationRoot, PropertyNode, Schema, Selector, Value, ValueKind};
