use async_trait::async_trait;
use rand::Rng;
use rand::SeedableRng;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::debug;

use crate::application::EmbeddingService;
use crate::domain::{DomainError, EmbeddingConfig};

/// Deterministic embeddings for development and tests.
///
/// Each text seeds an RNG with its hash, so equal texts get equal unit vectors.
pub struct MockEmbedding {
    config: EmbeddingConfig,
}

impl MockEmbedding {
    pub fn new() -> Self {
        Self {
            config: EmbeddingConfig::default(),
        }
    }

    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            config: EmbeddingConfig::new("mock-embedding".to_string(), dimensions, 512),
        }
    }

    fn generate_embedding(&self, text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let mut vector: Vec<f32> = (0..self.config.dimensions())
            .map(|_| rng.gen_range(-1.0..1.0))
            .collect();

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for x in &mut vector {
                *x /= magnitude;
            }
        }

        vector
    }
}

impl Default for MockEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingService for MockEmbedding {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        let vectors: Vec<Vec<f32>> = texts
            .iter()
            .map(|text| self.generate_embedding(text))
            .collect();

        debug!("Generated {} mock embeddings", vectors.len());

        Ok(vectors)
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, DomainError> {
        Ok(self.generate_embedding(query))
    }

    fn config(&self) -> &EmbeddingConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_embedding_consistency() {
        let service = MockEmbedding::new();

        let query = service.embed_query("quarterly revenue").await.unwrap();
        let documents = service
            .embed_documents(&["quarterly revenue".to_string(), "headcount".to_string()])
            .await
            .unwrap();

        assert_eq!(documents.len(), 2);
        assert_eq!(query, documents[0]);
        assert_ne!(documents[0], documents[1]);
    }

    #[tokio::test]
    async fn test_mock_embedding_dimensions() {
        let service = MockEmbedding::with_dimensions(128);

        let embedding = service.embed_query("test").await.unwrap();

        assert_eq!(embedding.len(), 128);
        assert_eq!(MockEmbedding::new().config().dimensions(), 384);
    }

    #[tokio::test]
    async fn test_mock_embedding_normalized() {
        let service = MockEmbedding::new();

        let embedding = service.embed_query("test").await.unwrap();
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();

        assert!((magnitude - 1.0).abs() < 0.001);
    }
}
