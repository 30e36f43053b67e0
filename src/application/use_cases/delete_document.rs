use std::sync::Arc;

use tracing::info;

use crate::application::DocumentRepository;
use crate::domain::{Document, DomainError};

/// Use case for deleting a document with its chunks and query records.
pub struct DeleteDocumentUseCase {
    document_repo: Arc<dyn DocumentRepository>,
}

impl DeleteDocumentUseCase {
    pub fn new(document_repo: Arc<dyn DocumentRepository>) -> Self {
        Self { document_repo }
    }

    pub async fn execute(&self, id: i64) -> Result<Document, DomainError> {
        let document = self
            .document_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Document not found: {}", id)))?;

        info!("Deleting document: {}", document.display_name());

        if !self.document_repo.delete(id).await? {
            return Err(DomainError::not_found(format!("Document not found: {}", id)));
        }

        info!("Document deleted successfully");

        Ok(document)
    }
}
