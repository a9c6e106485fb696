//! Google Gemini adapter.
//!
//! Native client for the `generateContent` API:
//! - Model goes in the URL path, not the request body
//! - Auth via `x-goog-api-key` header
//! - System prompt via `systemInstruction`
//! - Response text lives in `candidates[0].content.parts[].text`
//!
//! Quota exhaustion arrives either as 429 or as an error body with status
//! `RESOURCE_EXHAUSTED`; both surface as [`MimirError::RateLimited`].

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

/// Default base URL for the Gemini API
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Client for the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    http: Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a new Gemini client with the given API key.
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

    /// Send one prompt and return the concatenated candidate text.
    #[instrument(skip(self, prompt), fields(provider = "gemini", model = %self.model))]
    async fn generate(&self, prompt: String) -> Result<String> {
        if self.api_key.trim().is_empty() {
            return Err(MimirError::MissingCredential("gemini".to_string()));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        debug!(url = %url, "sending Gemini request");

        let body = GenerateRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: &prompt }],
            }],
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part {
                    text: prompts::SYSTEM_PROMPT,
                }],
            }),
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(http::transport_error)?;

        let response = http::check_status("gemini", response).await?;
        let parsed: GenerateResponse = http::decode(response).await?;
        parsed.into_text()
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| {
                MimirError::MalformedResponse("no candidates in Gemini response".into())
            })?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(MimirError::EmptyResponse);
        }
        Ok(text)
    }
}

// ============================================================================
// Provider Trait Implementation
// ============================================================================

#[async_trait]
impl CodeAnalysisProvider for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
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
        self.generate(prompts::analysis(code, language, analysis_type))
            .await
    }

    async fn explain_code(&self, code: &str, language: Language) -> Result<String> {
        self.generate(prompts::explanation(code, language)).await
    }

    async fn suggest_improvements(
        &self,
        code: &str,
        language: Language,
        context: Option<&str>,
    ) -> Result<String> {
        self.generate(prompts::improvements(code, language, context))
            .await
    }

    async fn generate_report(&self, results: &[Value], project_info: &Value) -> Result<String> {
        self.generate(prompts::report(results, project_info)).await
    }
}
