//! Property nodes and configuration roots.
//!
//! Nodes are immutable. A change produces a new node and a new spine up to
//! the root; untouched subtrees are shared through `Arc`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use crate::error::{ConfigError, ConfigResult};
use crate::tree::value::{Value, ValueKind};
use crate::validation::Validator;

/// Ordered validator chain attached to a leaf.
pub type ValidatorChain = Arc<[Arc<dyn Validator>]>;

/// A typed value plus the validators guarding it.
#[derive(Clone)]
pub struct Leaf {
    kind: ValueKind,
    value: Value,
    validators: ValidatorChain,
}

impl Leaf {
    pub(crate) fn new(kind: ValueKind, value: Value, validators: ValidatorChain) -> Self {
        Self {
            kind,
            value,
            validators,
        }
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn validators(&self) -> &[Arc<dyn Validator>] {
        &self.validators
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaf")
            .field("kind", &self.kind)
            .field("value", &self.value)
            .field("validators", &self.validators.len())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Branch {
    children: BTreeMap<String, Arc<PropertyNode>>,
}

impl Branch {
    pub(crate) fn new(children: BTreeMap<String, Arc<PropertyNode>>) -> Self {
        Self { children }
    }

    pub fn children(&self) -> &BTreeMap<String, Arc<PropertyNode>> {
        &self.children
    }
}

/// A node of the configuration tree.
#[derive(Debug, Clone)]
pub enum PropertyNode {
    Leaf(Leaf),
    Branch(Branch),
}

impl PropertyNode {
    /// Current value if this is a leaf.
    pub fn value(&self) -> Option<&Value> {
        match self {
            PropertyNode::Leaf(leaf) => Some(&leaf.value),
            PropertyNode::Branch(_) => None,
        }
    }

    /// Children if this is a branch.
    pub fn children(&self) -> Option<&BTreeMap<String, Arc<PropertyNode>>> {
        match self {
            PropertyNode::Leaf(_) => None,
            PropertyNode::Branch(branch) => Some(&branch.children),
        }
    }

    pub fn child(&self, name: &str) -> Option<&PropertyNode> {
        self.children()?.get(name).map(Arc::as_ref)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, PropertyNode::Leaf(_))
    }

    /// Short shape description used in type errors.
    pub fn describe(&self) -> String {
        match self {
            PropertyNode::Leaf(leaf) => leaf.kind.to_string(),
            PropertyNode::Branch(_) => "branch".to_string(),
        }
    }

    /// A new leaf carrying `value`; the receiver is left untouched.
    ///
    /// Fails if this is a branch or if the value does not fit the leaf kind.
    pub fn with_value(&self, path: &str, value: Value) -> ConfigResult<PropertyNode> {
        match self {
            PropertyNode::Leaf(leaf) if leaf.kind.admits(&value) => Ok(PropertyNode::Leaf(Leaf {
                kind: leaf.kind.clone(),
                value,
                validators: leaf.validators.clone(),
            })),
            PropertyNode::Leaf(leaf) => Err(ConfigError::InvalidValue {
                path: path.to_string(),
                expected: leaf.kind.to_string(),
                found: value.to_string(),
            }),
            PropertyNode::Branch(_) => Err(ConfigError::SelectorTypeMismatch {
                path: path.to_string(),
                expected: "leaf".to_string(),
                found: "branch".to_string(),
            }),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            PropertyNode::Leaf(leaf) => leaf.value.to_json(),
            PropertyNode::Branch(branch) => JsonValue::Object(
                branch
                    .children
                    .iter()
                    .map(|(name, child)| (name.clone(), child.to_json()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }

    /// Visit every leaf with its dotted path relative to `prefix`.
    pub fn for_each_leaf<'a>(&'a self, prefix: &str, f: &mut dyn FnMut(&str, &'a Leaf)) {
        match self {
            PropertyNode::Leaf(leaf) => f(prefix, leaf),
            PropertyNode::Branch(branch) => {
                for (name, child) in &branch.children {
                    let path = join_path(prefix, name);
                    child.for_each_leaf(&path, f);
                }
            }
        }
    }

    /// Copy of this subtree with the node at `segments` replaced.
    fn replaced(&self, segments: &[String], node: PropertyNode) -> Option<PropertyNode> {
        let Some((head, rest)) = segments.split_first() else {
            return Some(node);
        };
        let branch = match self {
            PropertyNode::Branch(branch) => branch,
            PropertyNode::Leaf(_) => return None,
        };
        let child = branch.children.get(head)?;
        let new_child = child.replaced(rest, node)?;
        let mut children = branch.children.clone();
        children.insert(head.clone(), Arc::new(new_child));
        Some(PropertyNode::Branch(Branch { children }))
    }
}

/// Shape and values are compared; validator chains are not.
impl PartialEq for PropertyNode {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropertyNode::Leaf(a), PropertyNode::Leaf(b)) => a.kind == b.kind && a.value == b.value,
            (PropertyNode::Branch(a), PropertyNode::Branch(b)) => a.children == b.children,
            _ => false,
        }
    }
}

/// Snapshot of one named configuration subsystem.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationRoot {
    name: String,
    node: Arc<PropertyNode>,
}

impl ConfigurationRoot {
    pub(crate) fn new(name: impl Into<String>, node: PropertyNode) -> Self {
        Self {
            name: name.into(),
            node: Arc::new(node),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node(&self) -> &PropertyNode {
        &self.node
    }

    /// Serializable view of the whole root.
    pub fn to_json(&self) -> JsonValue {
        self.node.to_json()
    }

    /// Node at `segments` below the root (an empty slice is the root itself).
    pub fn lookup(&self, segments: &[String]) -> Option<&PropertyNode> {
        segments
            .iter()
            .try_fold(self.node.as_ref(), |node, segment| node.child(segment))
    }

    /// A new root with the node at `segments` replaced by `node`.
    pub fn replace(&self, segments: &[String], node: PropertyNode) -> ConfigResult<Self> {
        let replaced = self.node.replaced(segments, node).ok_or_else(|| {
            let mut path = self.name.clone();
            for s in segments {
                path = join_path(&path, s);
            }
            ConfigError::not_found(path)
        })?;
        Ok(Self {
            name: self.name.clone(),
            node: Arc::new(replaced),
        })
    }
}

pub(crate) fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::schema::Schema;
    use serde_json::json;

    fn rest_root() -> ConfigurationRoot {
        Schema::branch()
            .child("port", Schema::leaf(ValueKind::Int))
            .child("portRange", Schema::leaf(ValueKind::Int))
            .build("rest", &json!({"port": 8080, "portRange": 0}))
            .unwrap()
    }

    #[test]
    fn test_with_value_leaves_receiver_intact() {
        let root = rest_root();
        let port = root.lookup(&["port".to_string()]).unwrap();
        let updated = port.with_value("rest.port", Value::Int(9090)).unwrap();

        assert_eq!(updated.value(), Some(&Value::Int(9090)));
        assert_eq!(port.value(), Some(&Value::Int(8080)));
    }

    #[test]
    fn test_with_value_rejects_wrong_kind() {
        let root = rest_root();
        let port = root.lookup(&["port".to_string()]).unwrap();
        let err = port.with_value("rest.port", Value::Bool(true)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_replace_shares_untouched_children() {
        let root = rest_root();
        let port = root.lookup(&["port".to_string()]).unwrap();
        let next = root
            .replace(&["port".to_string()], port.with_value("rest.port", 9090.into()).unwrap())
            .unwrap();

        assert_eq!(next.to_json(), json!({"port": 9090, "portRange": 0}));
        assert_eq!(root.to_json(), json!({"port": 8080, "portRange": 0}));

        let old_range = root.node().children().unwrap().get("portRange").unwrap();
        let new_range = next.node().children().unwrap().get("portRange").unwrap();
        assert!(Arc::ptr_eq(old_range, new_range));
    }

    #[test]
    fn test_replace_missing_segment() {
        let root = rest_root();
        let err = root
            .replace(&["host".to_string()], PropertyNode::Branch(Branch::default()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::SelectorNotFound { ref path } if path == "rest.host"));
    }

    #[test]
    fn test_for_each_leaf_paths() {
        let root = rest_root();
        let mut paths = Vec::new();
        root.node().for_each_leaf("rest", &mut |path, _| paths.push(path.to_string()));
        assert_eq!(paths, vec!["rest.port", "rest.portRange"]);
    }
}
