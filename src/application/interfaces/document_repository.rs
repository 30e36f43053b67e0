use async_trait::async_trait;

use crate::domain::{ChunkDraft, Document, DocumentChunk, DomainError, NewDocument};

/// Persistence for documents and their chunks.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn save_document(&self, document: NewDocument) -> Result<Document, DomainError>;

    /// Stores all chunks of a document atomically.
    async fn save_chunks(
        &self,
        document_id: i64,
        chunks: &[ChunkDraft],
    ) -> Result<Vec<DocumentChunk>, DomainError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Document>, DomainError>;

    /// Newest first.
    async fn list(&self) -> Result<Vec<Document>, DomainError>;

    /// Ordered by chunk index.
    async fn find_chunks(&self, document_id: i64) -> Result<Vec<DocumentChunk>, DomainError>;

    /// Deletes a document with its chunks and query records.
    /// Returns `false` when the document does not exist.
    async fn delete(&self, id: i64) -> Result<bool, DomainError>;

    async fn count_chunks(&self) -> Result<u64, DomainError>;
}
