//! Dotted-path selectors.
//!
//! A selector's first segment names the root, the rest walk the tree:
//! `rest.port`, `baseline.autoAdjust.enabled`. Compilation is pure, so equal
//! text always yields equal selectors.

use std::fmt;
use std::marker::PhantomData;

use crate::error::{ConfigError, ConfigResult};
use crate::tree::node::{ConfigurationRoot, PropertyNode};
use crate::tree::value::Value;

/// Types a selector can resolve to.
pub trait Selectable: Sized {
    /// Name used in type-mismatch errors.
    const EXPECTED: &'static str;

    fn from_node(node: &PropertyNode) -> Option<Self>;
}

impl Selectable for PropertyNode {
    const EXPECTED: &'static str = "node";

    fn from_node(node: &PropertyNode) -> Option<Self> {
        Some(node.clone())
    }
}

impl Selectable for Value {
    const EXPECTED: &'static str = "leaf";

    fn from_node(node: &PropertyNode) -> Option<Self> {
        node.value().cloned()
    }
}

impl Selectable for i64 {
    const EXPECTED: &'static str = "int";

    fn from_node(node: &PropertyNode) -> Option<Self> {
        node.value()?.as_i64()
    }
}

impl Selectable for bool {
    const EXPECTED: &'static str = "bool";

    fn from_node(node: &PropertyNode) -> Option<Self> {
        node.value()?.as_bool()
    }
}

impl Selectable for f64 {
    const EXPECTED: &'static str = "float";

    fn from_node(node: &PropertyNode) -> Option<Self> {
        node.value()?.as_f64()
    }
}

impl Selectable for String {
    const EXPECTED: &'static str = "string";

    fn from_node(node: &PropertyNode) -> Option<Self> {
        node.value()?.as_str().map(str::to_string)
    }
}

impl Selectable for Vec<Value> {
    const EXPECTED: &'static str = "list";

    fn from_node(node: &PropertyNode) -> Option<Self> {
        match node.value()? {
            Value::List(items) => Some(items.clone()),
            _ => None,
        }
    }
}

/// Compiled path into a configuration tree, typed by its expected result.
pub struct Selector<T = PropertyNode> {
    path: String,
    segments: Vec<String>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Selectable> Selector<T> {
    pub fn compile(path: &str) -> ConfigResult<Self> {
        let invalid = |reason: &str| ConfigError::InvalidSelectorSyntax {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        if path.is_empty() {
            return Err(invalid("selector is empty"));
        }
        let mut segments = Vec::new();
        for segment in path.split('.') {
            if segment.is_empty() {
                return Err(invalid("empty path segment"));
            }
            if segment.chars().any(char::is_whitespace) {
                return Err(invalid("whitespace in path segment"));
            }
            segments.push(segment.to_string());
        }

        Ok(Self {
            path: path.to_string(),
            segments,
            _marker: PhantomData,
        })
    }

    /// Resolve and convert to `T`.
    pub fn extract(&self, root: &ConfigurationRoot) -> ConfigResult<T> {
        let node = self.resolve(root)?;
        T::from_node(node).ok_or_else(|| ConfigError::SelectorTypeMismatch {
            path: self.path.clone(),
            expected: T::EXPECTED.to_string(),
            found: node.describe(),
        })
    }
}

impl<T> Selector<T> {
    /// Walk `root` by child name.
    pub fn resolve<'a>(&self, root: &'a ConfigurationRoot) -> ConfigResult<&'a PropertyNode> {
        if self.root_name() != root.name() {
            return Err(ConfigError::not_found(&self.path));
        }
        let mut node = root.node();
        for (depth, segment) in self.segments[1..].iter().enumerate() {
            node = node.child(segment).ok_or_else(|| {
                ConfigError::not_found(self.segments[..depth + 2].join("."))
            })?;
        }
        Ok(node)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn root_name(&self) -> &str {
        &self.segments[0]
    }

    /// Segments below the root.
    pub fn relative(&self) -> &[String] {
        &self.segments[1..]
    }
}

impl<T> Clone for Selector<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            segments: self.segments.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Selector<T> {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl<T> Eq for Selector<T> {}

impl<T> fmt::Debug for Selector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selector").field(&self.path).finish()
    }
}

impl<T> fmt::Display for Selector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::schema::Schema;
    use crate::tree::value::ValueKind;
    use serde_json::json;

    fn root() -> ConfigurationRoot {
        Schema::branch()
            .child(
                "autoAdjust",
                Schema::branch()
                    .child("enabled", Schema::leaf(ValueKind::Bool))
                    .child("timeout", Schema::leaf(ValueKind::Int)),
            )
            .build("baseline", &json!({"autoAdjust": {"enabled": true, "timeout": 5}}))
            .unwrap()
    }

    #[test]
    fn test_compile_rejects_malformed() {
        for path in ["", ".a", "a.", "a..b", "a. b"] {
            let err = Selector::<PropertyNode>::compile(path).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidSelectorSyntax { .. }), "{path}");
        }
    }

    #[test]
    fn test_compile_is_deterministic() {
        let a = Selector::<i64>::compile("baseline.autoAdjust.timeout").unwrap();
        let b = Selector::<i64>::compile("baseline.autoAdjust.timeout").unwrap();
        assert_eq!(a, b);

        let root = root();
        assert_eq!(a.extract(&root).unwrap(), 5);
        assert_eq!(a.extract(&root).unwrap(), b.extract(&root).unwrap());
    }

    #[test]
    fn test_resolve_root_itself() {
        let root = root();
        let sel = Selector::<PropertyNode>::compile("baseline").unwrap();
        assert_eq!(sel.resolve(&root).unwrap(), root.node());
    }

    #[test]
    fn test_path_past_leaf_is_not_found() {
        let root = root();
        let sel = Selector::<PropertyNode>::compile("baseline.autoAdjust.timeout.extra").unwrap();
        let err = sel.resolve(&root).unwrap_err();
        assert!(
            matches!(err, ConfigError::SelectorNotFound { ref path } if path == "baseline.autoAdjust.timeout.extra")
        );
    }

    #[test]
    fn test_first_missing_segment_reported() {
        let root = root();
        let sel = Selector::<PropertyNode>::compile("baseline.manual.timeout").unwrap();
        let err = sel.resolve(&root).unwrap_err();
        assert!(matches!(err, ConfigError::SelectorNotFound { ref path } if path == "baseline.manual"));

        let other = Selector::<PropertyNode>::compile("rest.port").unwrap();
        assert!(matches!(other.resolve(&root), Err(ConfigError::SelectorNotFound { .. })));
    }

    #[test]
    fn test_branch_for_scalar_is_type_mismatch() {
        let root = root();
        let sel = Selector::<bool>::compile("baseline.autoAdjust").unwrap();
        let err = sel.extract(&root).unwrap_err();
        assert!(matches!(err, ConfigError::SelectorTypeMismatch { ref found, .. } if found == "branch"));

        let wrong_kind = Selector::<String>::compile("baseline.autoAdjust.enabled").unwrap();
        assert!(matches!(
            wrong_kind.extract(&root),
            Err(ConfigError::SelectorTypeMismatch { .. })
        ));
    }
}
