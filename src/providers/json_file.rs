use std::path::Path;

use super::RawSettingsProvider;
use crate::error::FillfigError;
use crate::value::Value;

/// JSON-backed provider with the same key and value rules as
/// [`TomlProvider`](super::TomlProvider).
///
/// A key holding `null` reads as unknown. Nulls inside arrays and objects are
/// kept as [`Value::Null`].
#[derive(Debug, Clone)]
pub struct JsonProvider {
    root: serde_json::Value,
    separator: char,
}

impl JsonProvider {
    pub fn from_json(root: serde_json::Value) -> Self {
        Self {
            root,
            separator: '.',
        }
    }

    pub fn parse(content: &str) -> Result<Self, FillfigError> {
        parse_document(content, Path::new("<inline>")).map(Self::from_json)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FillfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| FillfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        parse_document(&content, path).map(Self::from_json)
    }

    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }
}

impl RawSettingsProvider for JsonProvider {
    fn get_raw_setting(&self, key: &str) -> Result<Option<Value>, FillfigError> {
        if key.is_empty() {
            return Err(FillfigError::empty_key());
        }
        let mut current = &self.root;
        for segment in key.split(self.separator) {
            match current.get(segment) {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        if current.is_null() {
            return Ok(None);
        }
        Ok(Some(to_value(current)))
    }
}

fn parse_document(content: &str, path: &Path) -> Result<serde_json::Value, FillfigError> {
    serde_json::from_str(content).map_err(|e| FillfigError::ParseError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn to_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::String(b.to_string()),
        serde_json::Value::Number(n) => Value::String(n.to_string()),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(to_value).collect()),
        serde_json::Value::Object(map) => Value::Map(
            map.iter()
                .map(|(k, v)| (Value::String(k.clone()), to_value(v)))
                .collect(),
        ),
    }
}
