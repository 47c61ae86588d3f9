//! Concise JSON, the canonical persisted and REST format.

use serde_json::Value as JsonValue;

use crate::presentation::{ConvertError, Format, FormatConverter};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConverter;

impl JsonConverter {
    pub fn new() -> Self {
        Self
    }
}

impl FormatConverter for JsonConverter {
    fn format(&self) -> Format {
        Format::Json
    }

    fn convert_to(&self, value: &JsonValue) -> String {
        value.to_string()
    }

    fn convert_from(&self, text: &str) -> Result<JsonValue, ConvertError> {
        Ok(serde_json::from_str(text)?)
    }
}
