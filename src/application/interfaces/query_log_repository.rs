use async_trait::async_trait;

use crate::domain::{DomainError, NewQueryRecord, QueryRecord};

/// Log of answered questions.
#[async_trait]
pub trait QueryLogRepository: Send + Sync {
    async fn save(&self, record: NewQueryRecord) -> Result<QueryRecord, DomainError>;

    /// Newest first.
    async fn list(&self, limit: usize) -> Result<Vec<QueryRecord>, DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}
