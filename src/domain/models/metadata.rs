use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A scalar metadata value. Anything richer is flattened to text before storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetadataValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl std::fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataValue::Bool(b) => write!(f, "{}", b),
            MetadataValue::Integer(i) => write!(f, "{}", i),
            MetadataValue::Float(x) => write!(f, "{}", x),
            MetadataValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Integer(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

/// Flat chunk metadata, keys ordered for stable serialization.
pub type ChunkMetadata = BTreeMap<String, MetadataValue>;

/// Flattens loader metadata into scalars.
///
/// Strings, integers, floats and booleans are kept as they are. Arrays and
/// objects become their JSON text and `null` becomes `"null"`.
pub fn filter_metadata(metadata: &Map<String, Value>) -> ChunkMetadata {
    metadata
        .iter()
        .map(|(key, value)| (key.clone(), flatten_value(value)))
        .collect()
}

fn flatten_value(value: &Value) -> MetadataValue {
    match value {
        Value::String(s) => MetadataValue::Text(s.clone()),
        Value::Bool(b) => MetadataValue::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                MetadataValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                MetadataValue::Float(f)
            } else {
                MetadataValue::Text(n.to_string())
            }
        }
        Value::Null => MetadataValue::Text("null".to_string()),
        Value::Array(_) | Value::Object(_) => MetadataValue::Text(value.to_string()),
    }
}

/// Converts flat metadata back into a JSON object.
pub fn metadata_to_json(metadata: &ChunkMetadata) -> Map<String, Value> {
    metadata
        .iter()
        .map(|(k, v)| {
            let value = match v {
                MetadataValue::Bool(b) => Value::Bool(*b),
                MetadataValue::Integer(i) => Value::from(*i),
                MetadataValue::Float(f) => Value::from(*f),
                MetadataValue::Text(s) => Value::String(s.clone()),
            };
            (k.clone(), value)
        })
        .collect()
}
