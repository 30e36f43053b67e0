use async_trait::async_trait;

use crate::domain::DomainError;

/// A chat completion model.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, DomainError>;

    fn model_name(&self) -> &str;
}
