use async_trait::async_trait;

use crate::domain::{DomainError, RetrievalQuery, RetrievedChunk};

/// Similarity search over stored chunk embeddings.
#[async_trait]
pub trait VectorRepository: Send + Sync {
    /// Only chunks whose embedding has the query's dimension are scored.
    async fn search(
        &self,
        query_embedding: &[f32],
        query: &RetrievalQuery,
    ) -> Result<Vec<RetrievedChunk>, DomainError>;
}
