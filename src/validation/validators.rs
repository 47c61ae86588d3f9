//! Built-in validators.

use std::fmt;

use crate::tree::{Selector, ValueKind};
use crate::validation::{ValidationContext, ValidationFailure, Validator};

/// Inclusive integer range.
#[derive(Debug, Clone, Copy)]
pub struct RangeValidator {
    min: i64,
    max: i64,
}

impl RangeValidator {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn at_least(min: i64) -> Self {
        Self { min, max: i64::MAX }
    }
}

impl Validator for RangeValidator {
    fn kind(&self) -> Option<ValueKind> {
        Some(ValueKind::Int)
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), ValidationFailure> {
        match ctx.value.as_i64() {
            Some(v) if v < self.min => Err(ValidationFailure::new(format!(
                "{} must be at least {}, got {}",
                ctx.path, self.min, v
            ))),
            Some(v) if v > self.max => Err(ValidationFailure::new(format!(
                "{} must be at most {}, got {}",
                ctx.path, self.max, v
            ))),
            Some(_) => Ok(()),
            None => Err(ValidationFailure::new(format!("{} is not an int", ctx.path))),
        }
    }

    fn name(&self) -> &str {
        "range"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NonEmptyValidator;

impl Validator for NonEmptyValidator {
    fn kind(&self) -> Option<ValueKind> {
        Some(ValueKind::String)
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), ValidationFailure> {
        match ctx.value.as_str() {
            Some(s) if !s.trim().is_empty() => Ok(()),
            _ => Err(ValidationFailure::new(format!("{} must not be empty", ctx.path))),
        }
    }

    fn name(&self) -> &str {
        "non_empty"
    }
}

/// A positive auto-adjust timeout requires auto-adjust to be enabled.
///
/// The enabled flag is read from the proposed root, so a request that flips
/// both leaves at once is accepted.
#[derive(Debug, Clone)]
pub struct AutoAdjustValidator {
    enabled: String,
    message: String,
}

impl AutoAdjustValidator {
    /// `enabled` is the full path of the boolean switch.
    pub fn new(enabled: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            enabled: enabled.into(),
            message: message.into(),
        }
    }
}

impl Validator for AutoAdjustValidator {
    fn kind(&self) -> Option<ValueKind> {
        Some(ValueKind::Int)
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), ValidationFailure> {
        let enabled = Selector::<bool>::compile(&self.enabled)
            .and_then(|s| s.extract(ctx.new_root))
            .map_err(|e| ValidationFailure::new(e.to_string()))?;

        match ctx.value.as_i64() {
            Some(timeout) if timeout > 0 && !enabled => Err(ValidationFailure::new(self.message.clone())),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "auto_adjust"
    }
}

type CheckFn = dyn Fn(&ValidationContext<'_>) -> Result<(), ValidationFailure> + Send + Sync;

/// Closure adaptor for one-off checks.
pub struct FnValidator {
    kind: Option<ValueKind>,
    check: Box<CheckFn>,
}

impl FnValidator {
    pub fn new<F>(kind: Option<ValueKind>, check: F) -> Self
    where
        F: Fn(&ValidationContext<'_>) -> Result<(), ValidationFailure> + Send + Sync + 'static,
    {
        Self {
            kind,
            check: Box::new(check),
        }
    }
}

impl fmt::Debug for FnValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValidator").field("kind", &self.kind).finish()
    }
}

impl Validator for FnValidator {
    fn kind(&self) -> Option<ValueKind> {
        self.kind.clone()
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), ValidationFailure> {
        (self.check)(ctx)
    }

    fn name(&self) -> &str {
        "fn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ConfigurationRoot, Schema, Value};
    use serde_json::json;

    fn baseline(enabled: bool, timeout: i64) -> ConfigurationRoot {
        Schema::branch()
            .child(
                "autoAdjust",
                Schema::branch()
                    .child("enabled", Schema::leaf(ValueKind::Bool))
                    .child("timeout", Schema::leaf(ValueKind::Int)),
            )
            .build(
                "baseline",
                &json!({"autoAdjust": {"enabled": enabled, "timeout": timeout}}),
            )
            .unwrap()
    }

    fn run(v: &dyn Validator, value: Value, new_root: &ConfigurationRoot) -> Result<(), ValidationFailure> {
        v.validate(&ValidationContext {
            path: "baseline.autoAdjust.timeout",
            value: &value,
            new_root,
            old_root: new_root,
        })
    }

    #[test]
    fn test_auto_adjust_requires_enabled() {
        let v = AutoAdjustValidator::new("baseline.autoAdjust.enabled", "auto adjust is disabled");

        let disabled = baseline(false, 10);
        let err = run(&v, Value::Int(10), &disabled).unwrap_err();
        assert_eq!(err.message, "auto adjust is disabled");

        assert!(run(&v, Value::Int(0), &disabled).is_ok());
        assert!(run(&v, Value::Int(10), &baseline(true, 10)).is_ok());
    }

    #[test]
    fn test_auto_adjust_bad_path_fails_closed() {
        let v = AutoAdjustValidator::new("baseline.missing", "x");
        assert!(run(&v, Value::Int(1), &baseline(true, 1)).is_err());
    }

    #[test]
    fn test_range_bounds() {
        let v = RangeValidator::new(1, 65535);
        let root = baseline(true, 0);
        assert!(run(&v, Value::Int(1), &root).is_ok());
        assert!(run(&v, Value::Int(65535), &root).is_ok());
        assert!(run(&v, Value::Int(0), &root).is_err());
        assert!(run(&v, Value::Int(65536), &root).is_err());
    }

    #[test]
    fn test_non_empty() {
        let root = baseline(true, 0);
        assert!(run(&NonEmptyValidator, Value::from("node-1"), &root).is_ok());
        assert!(run(&NonEmptyValidator, Value::from("  "), &root).is_err());
    }
}
