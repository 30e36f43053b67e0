use async_trait::async_trait;
use tracing::debug;

use crate::application::ChatClient;
use crate::domain::DomainError;

pub const MOCK_MODEL_NAME: &str = "mock-llm";

/// Canned answers for development mode; no network access.
pub struct MockChatClient;

impl MockChatClient {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, DomainError> {
        debug!("Mock completion with {} chars of context", system.len());
        Ok(format!(
            "Simulated answer for the query: '{}'. This answer is based on the document data.",
            user
        ))
    }

    fn model_name(&self) -> &str {
        MOCK_MODEL_NAME
    }
}
