//! `rest` root: where the management endpoint listens.

use crate::tree::{Schema, ValueKind};
use crate::validation::RangeValidator;

pub const ROOT: &str = "rest";

pub const DEFAULT_PORT: i64 = 8080;

pub const PORT: &str = "rest.port";
pub const PORT_RANGE: &str = "rest.portRange";

pub fn schema() -> Schema {
    Schema::branch()
        .child(
            "port",
            Schema::leaf(ValueKind::Int)
                .with_default(DEFAULT_PORT)
                .validator(RangeValidator::new(1, 65535)),
        )
        .child(
            "portRange",
            Schema::leaf(ValueKind::Int)
                .with_default(0i64)
                .validator(RangeValidator::new(0, 65535)),
        )
}
