use std::path::Path;

use serde_json::Value;

use crate::domain::{DomainError, Passage};

/// One passage per element of a top-level array, using each item's `content` field.
pub(super) fn load(path: &Path, source: &str) -> Result<Vec<Passage>, DomainError> {
    let raw = std::fs::read_to_string(path)?;
    parse(&raw, source)
}

fn parse(raw: &str, source: &str) -> Result<Vec<Passage>, DomainError> {
    let root: Value = serde_json::from_str(raw)
        .map_err(|e| DomainError::parse(format!("Invalid JSON: {}", e)))?;

    let items = match root {
        Value::Array(items) => items,
        _ => {
            return Err(DomainError::parse(
                "JSON document must be an array of records",
            ))
        }
    };

    Ok(items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let content = match item.get("content") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            };
            Passage::new(content.clone())
                .with_metadata("source", source)
                .with_metadata("seq_num", (i + 1) as u64)
                .with_metadata("content", content)
        })
        .collect())
}
