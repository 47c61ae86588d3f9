//! Compiled-in configuration schemas and tree construction.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::error::{ConfigError, ConfigResult};
use crate::tree::node::{join_path, Branch, ConfigurationRoot, Leaf, PropertyNode};
use crate::tree::value::{describe, Value, ValueKind};
use crate::validation::Validator;

/// Declaration of a single leaf.
#[derive(Clone)]
pub struct LeafSchema {
    kind: ValueKind,
    default: Option<Value>,
    validators: Vec<Arc<dyn Validator>>,
}

impl LeafSchema {
    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// A leaf without default must be present in the initial data.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Shape of a configuration root.
#[derive(Clone)]
pub enum Schema {
    Leaf(LeafSchema),
    Branch(BTreeMap<String, Schema>),
}

impl Schema {
    pub fn branch() -> Self {
        Schema::Branch(BTreeMap::new())
    }

    pub fn leaf(kind: ValueKind) -> Self {
        Schema::Leaf(LeafSchema {
            kind,
            default: None,
            validators: Vec::new(),
        })
    }

    /// Add a child to a branch schema. Ignored on leaves.
    pub fn child(mut self, name: impl Into<String>, child: Schema) -> Self {
        if let Schema::Branch(children) = &mut self {
            children.insert(name.into(), child);
        }
        self
    }

    /// Set the default value of a leaf schema. Ignored on branches.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        if let Schema::Leaf(leaf) = &mut self {
            leaf.default = Some(value.into());
        }
        self
    }

    /// Append a validator to a leaf schema. Ignored on branches.
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        if let Schema::Leaf(leaf) = &mut self {
            leaf.validators.push(Arc::new(validator));
        }
        self
    }

    /// Registration-time consistency check.
    ///
    /// A validator declared for another kind, or a default that does not fit
    /// its leaf, is a schema bug and is reported before any data is read.
    pub fn check(&self, root: &str) -> ConfigResult<()> {
        self.check_at(root, root)
    }

    fn check_at(&self, root: &str, path: &str) -> ConfigResult<()> {
        match self {
            Schema::Leaf(leaf) => {
                if let Some(default) = &leaf.default {
                    if !leaf.kind.admits(default) {
                        return Err(ConfigError::schema(
                            root,
                            format!("default {} of '{}' is not a {}", default, path, leaf.kind),
                        ));
                    }
                }
                for v in &leaf.validators {
                    if let Some(kind) = v.kind() {
                        if kind != leaf.kind {
                            return Err(ConfigError::schema(
                                root,
                                format!(
                                    "validator '{}' on '{}' expects {}, leaf is {}",
                                    v.name(),
                                    path,
                                    kind,
                                    leaf.kind
                                ),
                            ));
                        }
                    }
                }
                Ok(())
            }
            Schema::Branch(children) => children
                .iter()
                .try_for_each(|(name, child)| child.check_at(root, &join_path(path, name))),
        }
    }

    /// Build a root of exactly this shape from raw data.
    pub fn build(&self, root: &str, raw: &JsonValue) -> ConfigResult<ConfigurationRoot> {
        self.check(root)?;
        let node = self.build_node(root, root, Some(raw))?;
        Ok(ConfigurationRoot::new(root, node))
    }

    /// Build a root, taking values from `overlay` first and `base` second.
    pub(crate) fn build_layered(
        &self,
        root: &str,
        base: &JsonValue,
        overlay: &JsonValue,
    ) -> ConfigResult<ConfigurationRoot> {
        let mut merged = base.clone();
        merge_json(&mut merged, overlay);
        self.build(root, &merged)
    }

    fn build_node(&self, root: &str, path: &str, raw: Option<&JsonValue>) -> ConfigResult<PropertyNode> {
        match self {
            Schema::Leaf(leaf) => {
                let value = match raw {
                    Some(raw) => leaf.kind.coerce(raw).ok_or_else(|| {
                        ConfigError::schema(
                            root,
                            format!("'{}' expects {}, got {}", path, leaf.kind, describe(raw)),
                        )
                    })?,
                    None => leaf.default.clone().ok_or_else(|| {
                        ConfigError::schema(root, format!("missing required value '{}'", path))
                    })?,
                };
                Ok(PropertyNode::Leaf(Leaf::new(
                    leaf.kind.clone(),
                    value,
                    leaf.validators.clone().into(),
                )))
            }
            Schema::Branch(children) => {
                let object = match raw {
                    None => None,
                    Some(JsonValue::Object(map)) => Some(map),
                    Some(other) => {
                        return Err(ConfigError::schema(
                            root,
                            format!("'{}' expects an object, got {}", path, describe(other)),
                        ))
                    }
                };
                if let Some(map) = object {
                    if let Some(unknown) = map.keys().find(|k| !children.contains_key(*k)) {
                        return Err(ConfigError::schema(
                            root,
                            format!("unknown key '{}'", join_path(path, unknown)),
                        ));
                    }
                }
                let mut built = BTreeMap::new();
                for (name, child) in children {
                    let child_raw = object.and_then(|m| m.get(name));
                    let node = child.build_node(root, &join_path(path, name), child_raw)?;
                    built.insert(name.clone(), Arc::new(node));
                }
                Ok(PropertyNode::Branch(Branch::new(built)))
            }
        }
    }
}

/// Deep-merge `overlay` into `base`; objects merge key by key, anything else replaces.
pub(crate) fn merge_json(base: &mut JsonValue, overlay: &JsonValue) {
    match (base, overlay) {
        (JsonValue::Object(base), JsonValue::Object(overlay)) => {
            for (k, v) in overlay {
                match base.get_mut(k) {
                    Some(existing) => merge_json(existing, v),
                    None => {
                        base.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}
