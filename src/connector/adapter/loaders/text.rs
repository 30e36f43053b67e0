use std::path::Path;

use crate::domain::{DomainError, Passage};

/// The whole file as one passage.
pub(super) fn load(path: &Path, source: &str) -> Result<Vec<Passage>, DomainError> {
    let content = std::fs::read_to_string(path)?;
    Ok(vec![Passage::new(content).with_metadata("source", source)])
}
