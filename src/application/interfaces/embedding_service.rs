use async_trait::async_trait;

use crate::domain::{DomainError, EmbeddingConfig};

/// Generates vector embeddings for chunk texts and questions.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError>;

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, DomainError>;

    fn config(&self) -> &EmbeddingConfig;
}
