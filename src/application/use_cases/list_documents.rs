use std::sync::Arc;

use crate::application::DocumentRepository;
use crate::domain::{Document, DocumentChunk, DomainError};

pub struct ListDocumentsUseCase {
    document_repo: Arc<dyn DocumentRepository>,
}

impl ListDocumentsUseCase {
    pub fn new(document_repo: Arc<dyn DocumentRepository>) -> Self {
        Self { document_repo }
    }

    pub async fn execute(&self) -> Result<Vec<Document>, DomainError> {
        self.document_repo.list().await
    }

    pub async fn get(&self, id: i64) -> Result<Document, DomainError> {
        self.document_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Document not found: {}", id)))
    }

    /// Chunks of a document ordered by index.
    pub async fn chunks(&self, id: i64) -> Result<Vec<DocumentChunk>, DomainError> {
        self.get(id).await?;
        self.document_repo.find_chunks(id).await
    }

    pub async fn count_chunks(&self) -> Result<u64, DomainError> {
        self.document_repo.count_chunks().await
    }
}
