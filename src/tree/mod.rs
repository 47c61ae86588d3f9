//! Typed, path-addressable configuration tree.
//!
//! # Data Flow
//! ```text
//! Schema (compiled in) + raw initial data
//!     → schema.rs (shape check, defaults)
//!     → ConfigurationRoot (Branch/Leaf tree, immutable)
//!     → selector.rs (dotted path → node)
//! ```
//!
//! # Design Decisions
//! - Node shape is fixed at construction; only leaf values change
//! - Changes build a new spine, untouched subtrees are shared
//! - Selector resolution is pure and safe from any number of readers

pub mod node;
pub mod schema;
pub mod selector;
pub mod value;

pub use node::{Branch, ConfigurationRoot, Leaf, PropertyNode};
pub use schema::{LeafSchema, Schema};
pub use selector::{Selectable, Selector};
pub use value::{Value, ValueKind};
