//! `baseline` root: automatic baseline adjustment.

use crate::tree::{Schema, ValueKind};
use crate::validation::{AutoAdjustValidator, RangeValidator};

pub const ROOT: &str = "baseline";

pub const AUTO_ADJUST_ENABLED: &str = "baseline.autoAdjust.enabled";
pub const AUTO_ADJUST_TIMEOUT: &str = "baseline.autoAdjust.timeout";

pub fn schema() -> Schema {
    Schema::branch().child(
        "autoAdjust",
        Schema::branch()
            .child("enabled", Schema::leaf(ValueKind::Bool).with_default(false))
            .child(
                "timeout",
                Schema::leaf(ValueKind::Int)
                    .with_default(0i64)
                    .validator(RangeValidator::at_least(0))
                    .validator(AutoAdjustValidator::new(
                        AUTO_ADJUST_ENABLED,
                        "Auto adjust timeout can't be set while auto adjust is disabled",
                    )),
            ),
    )
}
