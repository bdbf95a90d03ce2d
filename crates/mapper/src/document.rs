//! Rendered compose document.
//!
//! YAML output is emitted directly rather than through a serializer so that
//! every string scalar is double-quoted, which keeps values such as `"3.8"`,
//! `"no"` or `"0755"` from being re-typed by YAML readers. Double-quoted
//! scalars use JSON string escaping, a strict subset of YAML's.

use std::fmt::Write as _;

use serde_json::{Map, Value};

use crate::error::MapperError;

/// Output format of a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentFormat {
    #[default]
    Yaml,
    Json,
}

/// A pruned compose document ready for output
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeDocument {
    root: Map<String, Value>,
}

impl ComposeDocument {
    pub fn new(root: Map<String, Value>) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.root
    }

    /// Number of services in the document.
    pub fn service_count(&self) -> usize {
        self.root
            .get("services")
            .and_then(Value::as_object)
            .map_or(0, Map::len)
    }

    /// Renders in the requested format.
    pub fn render(&self, format: DocumentFormat) -> Result<String, MapperError> {
        match format {
            DocumentFormat::Yaml => Ok(self.to_yaml()),
            DocumentFormat::Json => self.to_json(),
        }
    }

    /// Block-style YAML with double-quoted strings.
    pub fn to_yaml(&self) -> String {
        let mut out = String::new();
        if self.root.is_empty() {
            out.push_str("{}\n");
        } else {
            write_mapping(&mut out, &self.root, 0);
        }
        out
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, MapperError> {
        let mut text = serde_json::to_string_pretty(&self.root)
            .map_err(|e| MapperError::Render(e.to_string()))?;
        text.push('\n');
        Ok(text)
    }
}

fn write_mapping(out: &mut String, map: &Map<String, Value>, indent: usize) {
    for (key, value) in map {
        let _ = write!(out, "{:indent$}{}:", "", yaml_key(key));
        write_nested(out, value, indent);
    }
}

fn write_sequence(out: &mut String, items: &[Value], indent: usize) {
    for item in items {
        let _ = write!(out, "{:indent$}-", "");
        write_nested(out, item, indent);
    }
}

/// Writes what follows `key:` or `-`.
fn write_nested(out: &mut String, value: &Value, indent: usize) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            out.push('\n');
            write_mapping(out, map, indent + 2);
        }
        Value::Array(items) if !items.is_empty() => {
            out.push('\n');
            write_sequence(out, items, indent + 2);
        }
        scalar => {
            out.push(' ');
            out.push_str(&yaml_scalar(scalar));
            out.push('\n');
        }
    }
}

fn yaml_scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(_) => "[]".to_owned(),
        Value::Object(_) => "{}".to_owned(),
    }
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s.escape_default()))
}

const RESERVED_KEYS: [&str; 9] = ["true", "false", "null", "yes", "no", "on", "off", "y", "n"];

/// Keys stay plain when a YAML reader would read them back as the same string.
fn yaml_key(key: &str) -> String {
    let plain = key
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !RESERVED_KEYS.contains(&key.to_ascii_lowercase().as_str());
    if plain { key.to_owned() } else { quote(key) }
}
