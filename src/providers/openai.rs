//! OpenAI chat completions adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use super::http::{self, MAX_OUTPUT_TOKENS, TEMPERATURE};
use super::prompts;
use super::traits::CodeAnalysisProvider;
use crate::types::{AnalysisType, Language, ProviderCapabilities};
use crate::{MimirError, Result};

/// Default base URL for the OpenAI API
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default OpenAI model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Client for `POST /v1/chat/completions`.
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: String,
    http: Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OpenAiClient {
    /// Create a new OpenAI client with the given API key.
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

    #[instrument(skip(self, prompt), fields(provider = "openai", model = %self.model))]
    async fn complete(&self, prompt: String) -> Result<String> {
        if self.api_key.trim().is_empty() {
            return Err(MimirError::MissingCredential("openai".to_string()));
        }

        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!(url = %url, "sending OpenAI request");

        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: prompts::SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_OUTPUT_TOKENS,
        };

        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(http::transport_error)?;

        let response = http::check_status("openai", response).await?;
        let parsed: ChatResponse = http::decode(response).await?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| MimirError::MalformedResponse("no choices in OpenAI response".into()))?
            .message
            .content
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(MimirError::EmptyResponse);
        }
        Ok(content)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
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

#[async_trait]
impl CodeAnalysisProvider for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::full()
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
        self.complete(prompts::analysis(code, language, analysis_type))
            .await
    }

    async fn explain_code(&self, code: &str, language: Language) -> Result<String> {
        self.complete(prompts::explanation(code, language)).await
    }

    async fn suggest_improvements(
        &self,
        code: &str,
        language: Language,
        context: Option<&str>,
    ) -> Result<String> {
        self.complete(prompts::improvements(code, language, context))
            .await
    }

    async fn generate_report(&self, results: &[Value], project_info: &Value) -> Result<String> {
        self.complete(prompts::report(results, project_info)).await
    }
}
