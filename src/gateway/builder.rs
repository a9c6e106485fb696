//! Builder for configuring gateway instances

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::FallbackOrchestrator;
use crate::providers::{
    AnthropicClient, CodeAnalysisProvider, DEFAULT_TIMEOUT, GeminiClient, OpenAiClient,
    ProviderRegistry, RetryConfig, anthropic, gemini, openai,
};
use crate::{MimirError, Result};

/// Default priority of the Gemini adapter (tried first).
pub const GEMINI_PRIORITY: u32 = 1;
/// Default priority of the OpenAI adapter.
pub const OPENAI_PRIORITY: u32 = 2;
/// Default priority of the Anthropic adapter.
pub const ANTHROPIC_PRIORITY: u32 = 3;

/// Main entry point for creating gateway instances.
pub struct Mimir;

impl Mimir {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> MimirBuilder {
        MimirBuilder::new()
    }
}

/// Per-adapter overrides. Unset fields keep the adapter's defaults.
///
/// Also the shape of a `[providers.<name>]` table in `mimird` config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub priority: Option<u32>,
}

impl ProviderSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// One configured built-in adapter.
struct AdapterConfig {
    api_key: String,
    settings: ProviderSettings,
}

/// Builder for configuring gateway instances.
pub struct MimirBuilder {
    gemini: Option<AdapterConfig>,
    openai: Option<AdapterConfig>,
    anthropic: Option<AdapterConfig>,
    custom: Vec<(Arc<dyn CodeAnalysisProvider>, u32)>,
    retry: RetryConfig,
    timeout: Duration,
}

impl MimirBuilder {
    pub fn new() -> Self {
        Self {
            gemini: None,
            openai: None,
            anthropic: None,
            custom: Vec::new(),
            retry: RetryConfig::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Configure the Google Gemini adapter.
    ///
    /// An empty key still registers the adapter; it just reports unavailable.
    pub fn gemini(self, api_key: impl Into<String>) -> Self {
        self.gemini_with(api_key, ProviderSettings::default())
    }

    /// Configure the Gemini adapter with overrides.
    pub fn gemini_with(mut self, api_key: impl Into<String>, settings: ProviderSettings) -> Self {
        self.gemini = Some(AdapterConfig {
            api_key: api_key.into(),
            settings,
        });
        self
    }

    /// Configure the OpenAI adapter.
    pub fn openai(self, api_key: impl Into<String>) -> Self {
        self.openai_with(api_key, ProviderSettings::default())
    }

    /// Configure the OpenAI adapter with overrides.
    pub fn openai_with(mut self, api_key: impl Into<String>, settings: ProviderSettings) -> Self {
        self.openai = Some(AdapterConfig {
            api_key: api_key.into(),
            settings,
        });
        self
    }

    /// Configure the Anthropic adapter.
    pub fn anthropic(self, api_key: impl Into<String>) -> Self {
        self.anthropic_with(api_key, ProviderSettings::default())
    }

    /// Configure the Anthropic adapter with overrides.
    pub fn anthropic_with(
        mut self,
        api_key: impl Into<String>,
        settings: ProviderSettings,
    ) -> Self {
        self.anthropic = Some(AdapterConfig {
            api_key: api_key.into(),
            settings,
        });
        self
    }

    /// Register any other provider implementation.
    pub fn provider(mut self, provider: Arc<dyn CodeAnalysisProvider>, priority: u32) -> Self {
        self.custom.push((provider, priority));
        self
    }

    /// Set the rate-limit retry policy (default: 3 attempts, 1s doubling).
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Set the per-call timeout for the built-in adapters.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn has_provider(&self) -> bool {
        self.gemini.is_some()
            || self.openai.is_some()
            || self.anthropic.is_some()
            || !self.custom.is_empty()
    }

    /// Build the gateway.
    pub fn build(self) -> Result<FallbackOrchestrator> {
        if !self.has_provider() {
            return Err(MimirError::NoProvider);
        }

        let mut registry = ProviderRegistry::new();
        if self.retry.max_attempts > 1 {
            registry.set_retry_config(self.retry.clone());
        }

        // Shared connection pool for every built-in adapter
        let http_client = reqwest::Client::new();

        if let Some(config) = self.gemini {
            let settings = config.settings;
            let mut client = GeminiClient::with_http_client(
                config.api_key,
                settings.base_url.as_deref().unwrap_or(gemini::DEFAULT_BASE_URL),
                http_client.clone(),
            )
            .timeout(self.timeout);
            if let Some(model) = settings.model {
                client = client.model(model);
            }
            registry.register(Arc::new(client), settings.priority.unwrap_or(GEMINI_PRIORITY))?;
        }

        if let Some(config) = self.openai {
            let settings = config.settings;
            let mut client = OpenAiClient::with_http_client(
                config.api_key,
                settings.base_url.as_deref().unwrap_or(openai::DEFAULT_BASE_URL),
                http_client.clone(),
            )
            .timeout(self.timeout);
            if let Some(model) = settings.model {
                client = client.model(model);
            }
            registry.register(Arc::new(client), settings.priority.unwrap_or(OPENAI_PRIORITY))?;
        }

        if let Some(config) = self.anthropic {
            let settings = config.settings;
            let mut client = AnthropicClient::with_http_client(
                config.api_key,
                settings
                    .base_url
                    .as_deref()
                    .unwrap_or(anthropic::DEFAULT_BASE_URL),
                http_client,
            )
            .timeout(self.timeout);
            if let Some(model) = settings.model {
                client = client.model(model);
            }
            registry.register(
                Arc::new(client),
                settings.priority.unwrap_or(ANTHROPIC_PRIORITY),
            )?;
        }

        for (provider, priority) in self.custom {
            registry.register(provider, priority)?;
        }

        debug!(providers = ?registry.names(), "gateway built");
        Ok(FallbackOrchestrator::new(registry))
    }
}

impl Default for MimirBuilder {
    fn default() -> Self {
        Self::new()
    }
}
