use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::ChatClient;
use crate::domain::DomainError;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";
const COMPLETIONS_PATH: &str = "/chat/completions";
/// Value shipped in the sample `.env`; treated as "no key".
pub const PLACEHOLDER_API_KEY: &str = "your_groq_api_key";

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Returns the key when it is set to something other than the placeholder.
pub fn usable_api_key(key: Option<&str>) -> Option<String> {
    key.map(str::trim)
        .filter(|k| !k.is_empty() && *k != PLACEHOLDER_API_KEY)
        .map(str::to_string)
}

/// HTTP client for GroqCloud's OpenAI-compatible chat completions API.
///
/// Before each request the client sends a `HEAD` probe to the base URL with a
/// 2-second timeout, so an unreachable endpoint fails fast instead of waiting
/// for the 60-second request timeout. Any HTTP response counts as reachable.
pub struct GroqClient {
    client: reqwest::Client,
    probe_client: reqwest::Client,
    api_key: String,
    model: String,
    /// Base URL + `/chat/completions`.
    url: String,
    base_url: String,
}

impl GroqClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base: String = base_url.into();
        let trimmed = base.trim_end_matches('/');
        let url = format!("{trimmed}{COMPLETIONS_PATH}");
        let base_url = format!("{trimmed}/");
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            probe_client: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(2))
                .timeout(Duration::from_secs(2))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            model: model.into(),
            url,
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[async_trait]
impl ChatClient for GroqClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, DomainError> {
        match self.probe_client.head(&self.base_url).send().await {
            Err(e) if e.is_connect() || e.is_timeout() => {
                return Err(DomainError::llm(format!(
                    "Groq endpoint not reachable at {}: {e}",
                    self.base_url()
                )));
            }
            _ => {}
        }

        let request = ApiRequest {
            model: &self.model,
            messages: vec![
                ApiMessage {
                    role: "system",
                    content: system,
                },
                ApiMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.0,
        };

        debug!("Sending chat completion request to {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::llm(format!("Groq request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Groq API returned {status}: {body}");
            return Err(DomainError::llm(format!("Groq API returned {status}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| DomainError::llm(format!("Failed to parse Groq response: {e}")))?;

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| DomainError::llm("Groq response contained no message"))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
