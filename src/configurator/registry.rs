//! Registry of configurators keyed by root name.
//!
//! Built once at startup through [`RegistryBuilder`] and read-only afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use crate::configurator::Configurator;
use crate::error::{ConfigError, ConfigResult};
use crate::tree::value::describe;
use crate::tree::{PropertyNode, Selector};

#[derive(Default)]
pub struct RegistryBuilder {
    configurators: BTreeMap<String, Arc<Configurator>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, configurator: Configurator) -> ConfigResult<Self> {
        let name = configurator.name().to_string();
        if self.configurators.contains_key(&name) {
            return Err(ConfigError::DuplicateRoot { root: name });
        }
        tracing::debug!(root = %name, "Configurator registered");
        self.configurators.insert(name, Arc::new(configurator));
        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry {
            configurators: self.configurators,
        }
    }
}

pub struct Registry {
    configurators: BTreeMap<String, Arc<Configurator>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn configurator(&self, root: &str) -> ConfigResult<&Arc<Configurator>> {
        self.configurators
            .get(root)
            .ok_or_else(|| ConfigError::RootNotFound {
                root: root.to_string(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configurators.keys().map(String::as_str)
    }

    /// Every root's current value keyed by root name.
    pub fn snapshot(&self) -> JsonValue {
        JsonValue::Object(
            self.configurators
                .iter()
                .map(|(name, c)| (name.clone(), c.root().to_json()))
                .collect::<Map<_, _>>(),
        )
    }

    /// Public read of the node at a full dotted path (`root.sub.leaf`).
    pub fn property(&self, path: &str) -> ConfigResult<PropertyNode> {
        let selector = Selector::<PropertyNode>::compile(path)?;
        self.configurator(selector.root_name())?.get_public(&selector)
    }

    /// Apply a multi-root change `{root: {...}, ...}`.
    ///
    /// All root names are checked before anything is committed. Roots are
    /// then applied one at a time in name order; the first failure stops the
    /// request and is returned, roots committed before it stay committed.
    pub fn apply(&self, raw: &JsonValue) -> ConfigResult<()> {
        let JsonValue::Object(roots) = raw else {
            return Err(ConfigError::InvalidValue {
                path: String::new(),
                expected: "object".to_string(),
                found: describe(raw).to_string(),
            });
        };

        let mut targets = Vec::with_capacity(roots.len());
        for (name, value) in roots {
            targets.push((self.configurator(name)?, name, value));
        }
        targets.sort_by(|a, b| a.1.cmp(b.1));

        for (configurator, name, value) in targets {
            let selector = Selector::<PropertyNode>::compile(name)?;
            configurator.set(&selector, value)?;
        }
        Ok(())
    }
}
