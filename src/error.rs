//! Error taxonomy for the configuration core.
//!
//! Every failure is returned at the point of the failing call. Only
//! `SchemaViolation` is meant to stop anything, and only the module whose
//! configurator failed to build.

use thiserror::Error;

use crate::presentation::ConvertError;
use crate::storage::StorageError;

/// Result alias used throughout the configuration core.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The selector text could not be compiled.
    #[error("Invalid selector '{path}': {reason}")]
    InvalidSelectorSyntax { path: String, reason: String },

    /// A path segment does not exist in the tree.
    #[error("Selector not found: {path}")]
    SelectorNotFound { path: String },

    /// The node at the path has a different shape or type than requested.
    #[error("Selector '{path}' points to {found}, expected {expected}")]
    SelectorTypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// A submitted raw value does not fit the leaf type.
    #[error("Invalid value for '{path}': expected {expected}, got {found}")]
    InvalidValue {
        path: String,
        expected: String,
        found: String,
    },

    /// A validator rejected the proposed change.
    #[error("Validation failed for '{path}': {message}")]
    ValidationFailure { path: String, message: String },

    /// Initial data or schema does not match the compiled schema.
    #[error("Schema violation in root '{root}': {message}")]
    SchemaViolation { root: String, message: String },

    /// The storage adapter refused the write. Nothing was committed.
    #[error("Storage write failed for root '{root}': {source}")]
    StorageWriteFailed {
        root: String,
        #[source]
        source: StorageError,
    },

    #[error("Configuration root not found: {root}")]
    RootNotFound { root: String },

    #[error("Configuration root '{root}' is already registered")]
    DuplicateRoot { root: String },

    /// The payload could not be parsed by the converter.
    #[error("Malformed configuration payload: {0}")]
    Malformed(#[from] ConvertError),
}

impl ConfigError {
    /// Stable code exposed at the REST boundary.
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::InvalidSelectorSyntax { .. }
            | ConfigError::SelectorNotFound { .. }
            | ConfigError::SelectorTypeMismatch { .. }
            | ConfigError::RootNotFound { .. } => "CONFIG_PATH_UNRECOGNIZED",
            ConfigError::InvalidValue { .. } => "CONFIG_VALUE_INVALID",
            ConfigError::ValidationFailure { .. } => "CONFIG_VALIDATION_FAILED",
            ConfigError::StorageWriteFailed { .. } => "CONFIG_STORAGE_FAILED",
            ConfigError::Malformed(_) => "CONFIG_MALFORMED",
            ConfigError::SchemaViolation { .. } | ConfigError::DuplicateRoot { .. } => {
                "CONFIG_SCHEMA_VIOLATION"
            }
        }
    }

    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ConfigError::StorageWriteFailed { .. })
    }

    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        ConfigError::SelectorNotFound { path: path.into() }
    }

    pub(crate) fn schema(root: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::SchemaViolation {
            root: root.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_errors_share_code() {
        let errors = [
            ConfigError::not_found("rest.nope"),
            ConfigError::RootNotFound { root: "nope".into() },
            ConfigError::InvalidSelectorSyntax {
                path: "a..b".into(),
                reason: "empty segment".into(),
            },
        ];
        for e in errors {
            assert_eq!(e.code(), "CONFIG_PATH_UNRECOGNIZED");
            assert!(!e.is_retryable());
        }
    }

    #[test]
    fn test_storage_failure_is_retryable() {
        let e = ConfigError::StorageWriteFailed {
            root: "rest".into(),
            source: StorageError::Unavailable("disk full".into()),
        };
        assert!(e.is_retryable());
        assert_eq!(e.code(), "CONFIG_STORAGE_FAILED");
        assert!(e.to_string().contains("disk full"));
    }
}
