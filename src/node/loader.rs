//! Bootstrap configuration loading from disk.

use std::fs;
use std::path::Path;

use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::presentation::{ConvertError, FormatConverter, HoconConverter};
use crate::tree::value::describe;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ConvertError),

    #[error("Parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported bootstrap file extension '{0}'")]
    UnsupportedExtension(String),

    #[error("bootstrap configuration must be an object keyed by root name, got {0}")]
    NotAnObject(&'static str),
}

/// Load the bootstrap file, picking the parser from its extension.
pub fn load_bootstrap(path: &Path) -> Result<JsonValue, BootstrapError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let content = fs::read_to_string(path)?;
    parse_bootstrap(&content, &extension)
}

/// Parse bootstrap text of the given extension into a `{root: data}` map.
pub fn parse_bootstrap(content: &str, extension: &str) -> Result<JsonValue, BootstrapError> {
    let raw: JsonValue = match extension {
        "json" => serde_json::from_str(content).map_err(ConvertError::from)?,
        "conf" | "hocon" => HoconConverter::new().convert_from(content)?,
        "toml" => {
            let table: toml::Value = toml::from_str(content)?;
            serde_json::to_value(table).map_err(ConvertError::from)?
        }
        other => return Err(BootstrapError::UnsupportedExtension(other.to_string())),
    };

    match raw {
        JsonValue::Object(_) => Ok(raw),
        other => Err(BootstrapError::NotAnObject(describe(&other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_formats_agree() {
        let expected = json!({"rest": {"port": 9090, "portRange": 10}});

        let from_json = parse_bootstrap(r#"{"rest": {"port": 9090, "portRange": 10}}"#, "json").unwrap();
        let from_hocon = parse_bootstrap("rest { port = 9090, portRange = 10 }", "conf").unwrap();
        let from_toml = parse_bootstrap("[rest]\nport = 9090\nportRange = 10\n", "toml").unwrap();

        assert_eq!(from_json, expected);
        assert_eq!(from_hocon, expected);
        assert_eq!(from_toml, expected);
    }

    #[test]
    fn test_rejects_unknown_extension_and_non_object() {
        assert!(matches!(
            parse_bootstrap("a: 1", "yaml"),
            Err(BootstrapError::UnsupportedExtension(_))
        ));
        assert!(matches!(
            parse_bootstrap("[1, 2]", "json"),
            Err(BootstrapError::NotAnObject("list"))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"baseline": {{"autoAdjust": {{"enabled": true}}}}}}"#).unwrap();

        let raw = load_bootstrap(file.path()).unwrap();
        assert_eq!(raw, json!({"baseline": {"autoAdjust": {"enabled": true}}}));
    }

    #[test]
    fn test_missing_file() {
        let err = load_bootstrap(Path::new("/nonexistent/node.json")).unwrap_err();
        assert!(matches!(err, BootstrapError::Io(_)));
    }
}
