use std::path::Path;

use crate::domain::{DomainError, Passage};

const MAX_CONTROL_RATIO: f64 = 0.3;

/// Reads any file as text, rejecting content that looks binary.
pub(super) fn load(path: &Path, source: &str) -> Result<Vec<Passage>, DomainError> {
    let bytes = std::fs::read(path)?;
    let text = decode_text(&bytes).ok_or_else(|| {
        DomainError::unsupported(format!(
            "{} looks like a binary file and has no text loader",
            path.display()
        ))
    })?;

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(vec![Passage::new(text).with_metadata("source", source)])
}

/// Lossy UTF-8 decoding, `None` for NUL bytes or mostly control characters.
pub(super) fn decode_text(bytes: &[u8]) -> Option<String> {
    if bytes.contains(&0) {
        return None;
    }
    if !bytes.is_empty() {
        let control = bytes
            .iter()
            .filter(|&&b| (b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0C)) || b == 0x7F)
            .count();
        if control as f64 / bytes.len() as f64 > MAX_CONTROL_RATIO {
            return None;
        }
    }
    Some(String::from_utf8_lossy(bytes).into_owned())
}
