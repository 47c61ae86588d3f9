//! HOCON rendering and parsing.
//!
//! Rendering produces `key = value` lines with nested `key { ... }` blocks.
//! Parsing is delegated to the `hocon` crate and mapped onto the same JSON
//! view the tree produces, so both directions meet in the middle.

use ::hocon::{Hocon, HoconLoader};
use serde_json::{Map, Number, Value as JsonValue};

use crate::presentation::{ConvertError, Format, FormatConverter};

const INDENT: &str = "    ";

/// Key under which a bare (non-object) value is wrapped for parsing.
const SCALAR_KEY: &str = "value";

#[derive(Debug, Clone, Copy, Default)]
pub struct HoconConverter;

impl HoconConverter {
    pub fn new() -> Self {
        Self
    }
}

impl FormatConverter for HoconConverter {
    fn format(&self) -> Format {
        Format::Hocon
    }

    fn convert_to(&self, value: &JsonValue) -> String {
        let mut out = String::new();
        match value {
            JsonValue::Object(map) if !map.is_empty() => render_fields(&mut out, map, 0),
            other => render_value(&mut out, other, 0),
        }
        out
    }

    fn convert_from(&self, text: &str) -> Result<JsonValue, ConvertError> {
        match parse(text) {
            Ok(JsonValue::Object(map)) => Ok(JsonValue::Object(map)),
            Ok(other) => Ok(other),
            Err(document_err) => {
                // A bare value such as `8080` or `[1, 2]` is not a document.
                let wrapped = format!("{} = {}", SCALAR_KEY, text);
                match parse(&wrapped) {
                    Ok(JsonValue::Object(mut map)) if map.len() == 1 => {
                        map.remove(SCALAR_KEY).ok_or(document_err)
                    }
                    _ => Err(document_err),
                }
            }
        }
    }
}

fn parse(text: &str) -> Result<JsonValue, ConvertError> {
    let doc = HoconLoader::new()
        .load_str(text)
        .and_then(|loader| loader.hocon())
        .map_err(|e| ConvertError::Hocon(e.to_string()))?;
    to_json(doc)
}

fn to_json(doc: Hocon) -> Result<JsonValue, ConvertError> {
    Ok(match doc {
        Hocon::Null => JsonValue::Null,
        Hocon::Boolean(b) => JsonValue::Bool(b),
        Hocon::Integer(i) => JsonValue::from(i),
        Hocon::Real(x) => Number::from_f64(x)
            .map(JsonValue::Number)
            .ok_or_else(|| ConvertError::Hocon(format!("non-finite number {}", x)))?,
        Hocon::String(s) => JsonValue::String(s),
        Hocon::Array(items) => JsonValue::Array(items.into_iter().map(to_json).collect::<Result<_, _>>()?),
        Hocon::Hash(fields) => {
            let mut map = Map::new();
            for (k, v) in fields {
                map.insert(k, to_json(v)?);
            }
            JsonValue::Object(map)
        }
        Hocon::BadValue(e) => return Err(ConvertError::Hocon(e.to_string())),
    })
}

fn render_fields(out: &mut String, map: &Map<String, JsonValue>, depth: usize) {
    for (key, value) in map {
        out.push_str(&INDENT.repeat(depth));
        out.push_str(&render_key(key));
        match value {
            JsonValue::Object(_) => out.push(' '),
            _ => out.push_str(" = "),
        }
        render_value(out, value, depth);
        out.push('\n');
    }
}

fn render_value(out: &mut String, value: &JsonValue, depth: usize) {
    match value {
        JsonValue::Object(map) if map.is_empty() => out.push_str("{}"),
        JsonValue::Object(map) => {
            out.push_str("{\n");
            render_fields(out, map, depth + 1);
            out.push_str(&INDENT.repeat(depth));
            out.push('}');
        }
        JsonValue::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_value(out, item, depth);
            }
            out.push(']');
        }
        // Strings are always quoted; HOCON quoted strings use JSON escaping.
        other => out.push_str(&other.to_string()),
    }
}

fn render_key(key: &str) -> String {
    let bare = !key.is_empty()
        && !key.starts_with(|c: char| c.is_ascii_digit())
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        key.to_string()
    } else {
        JsonValue::String(key.to_string()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Schema, ValueKind};
    use serde_json::json;

    #[test]
    fn test_render_nested() {
        let text = HoconConverter::new().convert_to(&json!({
            "rest": {"port": 8080, "portRange": 0},
            "baseline": {"autoAdjust": {"enabled": false}}
        }));
        assert!(text.contains("rest {\n"));
        assert!(text.contains("    port = 8080\n"));
        assert!(text.contains("        enabled = false\n"));
    }

    #[test]
    fn test_parse_hocon_syntax() {
        let parsed = HoconConverter::new()
            .convert_from("rest.port = 9090\nbaseline { autoAdjust { enabled = true } }")
            .unwrap();
        assert_eq!(
            parsed,
            json!({"rest": {"port": 9090}, "baseline": {"autoAdjust": {"enabled": true}}})
        );
    }

    #[test]
    fn test_bare_values() {
        let c = HoconConverter::new();
        assert_eq!(c.convert_to(&json!(8080)), "8080");
        assert_eq!(c.convert_from("8080").unwrap(), json!(8080));
        assert_eq!(c.convert_to(&json!("a b")), "\"a b\"");
    }

    #[test]
    fn test_root_round_trip() {
        let schema = Schema::branch()
            .child("name", Schema::leaf(ValueKind::String))
            .child("ratio", Schema::leaf(ValueKind::Float))
            .child("hosts", Schema::leaf(ValueKind::List(Box::new(ValueKind::String))))
            .child(
                "limits",
                Schema::branch()
                    .child("max", Schema::leaf(ValueKind::Int))
                    .child("strict", Schema::leaf(ValueKind::Bool)),
            );
        let root = schema
            .build(
                "node",
                &json!({
                    "name": "node \"one\"",
                    "ratio": 1.5,
                    "hosts": ["10.0.0.1:3344", "10.0.0.2:3344"],
                    "limits": {"max": -1, "strict": true}
                }),
            )
            .unwrap();

        let c = HoconConverter::new();
        let text = c.convert_root_to(&root);
        assert_eq!(c.convert_root_from(&text, "node", &schema).unwrap(), root);
    }

    #[test]
    fn test_quoted_keys() {
        assert_eq!(render_key("portRange"), "portRange");
        assert_eq!(render_key("a.b"), "\"a.b\"");
        assert_eq!(render_key("1st"), "\"1st\"");
    }
}
