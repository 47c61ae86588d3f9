//! Presentation of configuration trees in external formats.
//!
//! # Data Flow
//! ```text
//! GET:  Registry → root/subtree JSON view → FormatConverter::convert_to → text
//! POST: text → FormatConverter::convert_from → Registry::apply → configurators
//! ```
//!
//! # Design Decisions
//! - The tree only knows how to produce a serde view of itself; formats are
//!   plugged in through the `FormatConverter` capability
//! - The format is chosen by configuration (`Format`), not by type

pub mod hocon;
pub mod json;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::configurator::Registry;
use crate::error::ConfigResult;
use crate::tree::{ConfigurationRoot, Schema};

pub use self::hocon::HoconConverter;
pub use self::json::JsonConverter;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid HOCON: {0}")]
    Hocon(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Hocon,
}

impl Format {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(Format::Json),
            "conf" | "hocon" => Some(Format::Hocon),
            _ => None,
        }
    }
}

impl FromStr for Format {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "hocon" | "conf" => Ok(Format::Hocon),
            other => Err(ConvertError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => write!(f, "json"),
            Format::Hocon => write!(f, "hocon"),
        }
    }
}

/// Bidirectional mapping between a tree view and a text format.
pub trait FormatConverter: Send + Sync {
    fn format(&self) -> Format;

    fn convert_to(&self, value: &JsonValue) -> String;

    fn convert_from(&self, text: &str) -> Result<JsonValue, ConvertError>;

    fn convert_root_to(&self, root: &ConfigurationRoot) -> String {
        self.convert_to(&root.to_json())
    }

    /// Parse `text` and build a root of `schema`'s shape from it.
    fn convert_root_from(
        &self,
        text: &str,
        root_name: &str,
        schema: &Schema,
    ) -> ConfigResult<ConfigurationRoot> {
        let raw = self.convert_from(text)?;
        schema.build(root_name, &raw)
    }
}

pub fn converter(format: Format) -> Arc<dyn FormatConverter> {
    match format {
        Format::Json => Arc::new(JsonConverter::new()),
        Format::Hocon => Arc::new(HoconConverter::new()),
    }
}

/// The registry seen through one converter.
#[derive(Clone)]
pub struct ConfigurationPresentation {
    registry: Arc<Registry>,
    converter: Arc<dyn FormatConverter>,
}

impl ConfigurationPresentation {
    pub fn new(registry: Arc<Registry>, converter: Arc<dyn FormatConverter>) -> Self {
        Self { registry, converter }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Every root, keyed by name.
    pub fn present(&self) -> String {
        self.converter.convert_to(&self.registry.snapshot())
    }

    /// The value at `path`; an empty path is the whole registry.
    pub fn present_by_path(&self, path: &str) -> ConfigResult<String> {
        if path.is_empty() {
            return Ok(self.present());
        }
        let node = self.registry.property(path)?;
        Ok(self.converter.convert_to(&node.to_json()))
    }

    /// Parse `text` and apply it as a multi-root change.
    pub fn update(&self, text: &str) -> ConfigResult<()> {
        let raw = self.converter.convert_from(text)?;
        self.registry.apply(&raw)
    }
}
