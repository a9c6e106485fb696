//! Anthropic Messages API adapter.
//!
//! Implements analyze, explain and improve. Report generation is not
//! offered by this adapter, so it keeps the trait's `Unsupported` default.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::http::{self, MAX_OUTPUT_TOKENS, TEMPERATURE};
use super::prompts;
use super::traits::CodeAnalysisProvider;
use crate::types::{AnalysisType, Language, ProviderCapabilities};
use crate::{MimirError, Result};

/// Default base URL for the Anthropic API
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Default Anthropic model
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";

/// Pinned API version header value.
const API_VERSION: &str = "2023-06-01";

/// Client for `POST /v1/messages`.
#[derive(Clone)]
pub struct AnthropicClient {
    api_key: String,
    http: Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl AnthropicClient {
    /// Create a new Anthropic client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::with_http_client(api_key, base_url, Client::new())
    }

    /// Create a client sharing an existing connection pool.
    pub fn with_http_client(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        http: Client,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: http::DEFAULT_TIMEOUT,
        }
    }

    /// Override the model id.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the per-call timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[instrument(skip(self, prompt), fields(provider = "anthropic", model = %self.model))]
    async fn message(&self, prompt: String) -> Result<String> {
        if self.api_key.trim().is_empty() {
            return Err(MimirError::MissingCredential("anthropic".to_string()));
        }

        let url = format!("{}/v1/messages", self.base_url);
        debug!(url = %url, "sending Anthropic request");

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
            system: prompts::SYSTEM_PROMPT,
            messages: [UserMessage {
                role: "user",
                content: &prompt,
            }],
        };

        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(http::transport_error)?;

        let response = http::check_status("anthropic", response).await?;
        let parsed: MessagesResponse = http::decode(response).await?;

        // Only `text` blocks carry prose; anything else is ignored.
        let text: String = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.trim().is_empty() {
            return Err(MimirError::EmptyResponse);
        }
        Ok(text)
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'static str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl CodeAnalysisProvider for AnthropicClient {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::core()
    }

    fn is_available(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn analyze_code(
        &self,
        code: &str,
        language: Language,
        analysis_type: AnalysisType,
    ) -> Result<String> {
        self.message(prompts::analysis(code, language, analysis_type))
            .await
    }

    async fn explain_code(&self, code: &str, language: Language) -> Result<String> {
        self.message(prompts::explanation(code, language)).await
    }

    async fn suggest_improvements(
        &self,
        code: &str,
        language: Language,
        context: Option<&str>,
    ) -> Result<String> {
        self.message(prompts::improvements(code, language, context))
            .await
    }
}
