//! Compiled-in configuration roots of a node.
//!
//! Each module owns one root: its name, its schema and the selectors other
//! subsystems use to read it.

pub mod baseline;
pub mod rest;

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::configurator::{Configurator, Registry};
use crate::error::{ConfigError, ConfigResult};
use crate::storage::ConfigurationStorage;
use crate::tree::Schema;

/// Name and schema of every built-in root.
pub fn builtin() -> Vec<(&'static str, Schema)> {
    vec![
        (baseline::ROOT, baseline::schema()),
        (rest::ROOT, rest::schema()),
    ]
}

/// Build the node registry from raw bootstrap data (`{root: {...}}`).
///
/// Roots absent from `bootstrap` start from their schema defaults; a root
/// no module declares is rejected.
pub fn build_registry(
    bootstrap: &JsonValue,
    storage: Arc<dyn ConfigurationStorage>,
) -> ConfigResult<Registry> {
    let modules = builtin();
    if let JsonValue::Object(roots) = bootstrap {
        if let Some(unknown) = roots.keys().find(|k| !modules.iter().any(|(name, _)| *name == k.as_str())) {
            return Err(ConfigError::RootNotFound {
                root: unknown.clone(),
            });
        }
    }

    let empty = JsonValue::Object(Default::default());
    let mut builder = Registry::builder();
    for (name, schema) in modules {
        let initial = bootstrap.get(name).unwrap_or(&empty);
        builder = builder.register(Configurator::create(name, schema, initial, storage.clone())?)?;
    }
    Ok(builder.build())
}
