//! Configuration validation.
//!
//! # Responsibilities
//! - Run field validators attached to each changed leaf
//! - Give cross-field validators the proposed and the previous root
//! - Report the first failure back to the caller
//!
//! # Design Decisions
//! - Validators are pure: (value, new root, old root) → ok | failure
//! - Leaves are checked in path order, validators in attachment order
//! - Declared validator types are checked when the schema is registered

pub mod validators;

use std::fmt;

use crate::error::{ConfigError, ConfigResult};
use crate::tree::{ConfigurationRoot, Leaf, Value, ValueKind};

pub use validators::{AutoAdjustValidator, FnValidator, NonEmptyValidator, RangeValidator};

/// Rejection reason produced by a validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub message: String,
}

impl ValidationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Everything a validator may look at.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Full dotted path of the edited leaf.
    pub path: &'a str,
    /// Proposed value of the edited leaf.
    pub value: &'a Value,
    /// Root with the change applied.
    pub new_root: &'a ConfigurationRoot,
    /// Root currently visible to readers.
    pub old_root: &'a ConfigurationRoot,
}

/// A check attached to a leaf.
pub trait Validator: Send + Sync {
    /// Leaf kind this validator understands; `None` accepts any.
    fn kind(&self) -> Option<ValueKind>;

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), ValidationFailure>;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Run the chain of a single leaf. The first failure wins.
pub fn validate(
    path: &str,
    leaf: &Leaf,
    new_root: &ConfigurationRoot,
    old_root: &ConfigurationRoot,
) -> ConfigResult<()> {
    let ctx = ValidationContext {
        path,
        value: leaf.value(),
        new_root,
        old_root,
    };
    for validator in leaf.validators() {
        if let Err(failure) = validator.validate(&ctx) {
            tracing::debug!(path, validator = validator.name(), reason = %failure, "Validation rejected change");
            return Err(ConfigError::ValidationFailure {
                path: path.to_string(),
                message: failure.message,
            });
        }
    }
    Ok(())
}

/// Validate every leaf listed in `changed` (full dotted paths) against `new_root`.
pub fn validate_changes(
    changed: &[String],
    new_root: &ConfigurationRoot,
    old_root: &ConfigurationRoot,
) -> ConfigResult<()> {
    let mut ordered: Vec<&String> = changed.iter().collect();
    ordered.sort();
    for path in ordered {
        let relative: Vec<String> = path.split('.').skip(1).map(str::to_string).collect();
        let leaf = match new_root.lookup(&relative) {
            Some(crate::tree::PropertyNode::Leaf(leaf)) => leaf,
            _ => return Err(ConfigError::not_found(path.as_str())),
        };
        validate(path, leaf, new_root, old_root)?;
    }
    Ok(())
}

/// Validate every leaf of `new_root`, changed or not.
///
/// Cross-field rules live on one leaf but read others, so editing the other
/// side must still run them.
pub fn validate_root(new_root: &ConfigurationRoot, old_root: &ConfigurationRoot) -> ConfigResult<()> {
    let mut result = Ok(());
    new_root.node().for_each_leaf(new_root.name(), &mut |path, leaf| {
        if result.is_ok() {
            result = validate(path, leaf, new_root, old_root);
        }
    });
    result
}

/// Validate every leaf of `root` against itself, as done at startup.
pub fn validate_all(root: &ConfigurationRoot) -> ConfigResult<()> {
    validate_root(root, root)
}
