use std::path::Path;

use async_trait::async_trait;

use crate::domain::{DomainError, Passage};

/// Turns a file into text passages.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<Vec<Passage>, DomainError>;
}
