use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::domain::{DomainError, Passage};

/// All text and CDATA nodes of the document, one per line.
pub(super) fn load(path: &Path, source: &str) -> Result<Vec<Passage>, DomainError> {
    let raw = std::fs::read_to_string(path)?;
    let content = text_nodes(&raw)?.join("\n");
    Ok(vec![Passage::new(content).with_metadata("source", source)])
}

pub(super) fn text_nodes(xml: &str) -> Result<Vec<String>, DomainError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut nodes = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| DomainError::parse(format!("Invalid XML text: {}", e)))?;
                if !text.trim().is_empty() {
                    nodes.push(text.trim().to_string());
                }
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).trim().to_string();
                if !text.is_empty() {
                    nodes.push(text);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(DomainError::parse(format!(
                    "Invalid XML at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    Ok(nodes)
}
