use std::sync::Arc;

use crate::application::QueryLogRepository;
use crate::domain::{DomainError, QueryRecord};

pub const DEFAULT_HISTORY_LIMIT: usize = 20;

pub struct QueryHistoryUseCase {
    query_log: Arc<dyn QueryLogRepository>,
}

impl QueryHistoryUseCase {
    pub fn new(query_log: Arc<dyn QueryLogRepository>) -> Self {
        Self { query_log }
    }

    /// Most recent queries first.
    pub async fn execute(&self, limit: usize) -> Result<Vec<QueryRecord>, DomainError> {
        self.query_log.list(limit).await
    }

    pub async fn count(&self) -> Result<u64, DomainError> {
        self.query_log.count().await
    }
}
