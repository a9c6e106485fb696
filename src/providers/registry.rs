//! Provider registry with priority ordering.
//!
//! The `ProviderRegistry` stores provider descriptors sorted ascending by
//! priority (lower number = tried earlier). It only answers "who, in what
//! order"; running the fallback chain is the orchestrator's job.
//!
//! # Retry Wrapping
//!
//! When a `RetryConfig` is set, providers are automatically wrapped in
//! `RetryingProvider` at registration time. This means each provider backs
//! off internally on rate limits before the orchestrator sees the failure.
//!
//! # Candidate Selection
//!
//! ```text
//! registry:   gemini(1)  openai(2)  anthropic(3)
//!                 │          │           │
//!                 ▼          ▼           ▼
//! available?     yes        yes         yes
//!                 │
//! preference = "anthropic"
//!                 ▼
//! candidates: anthropic, gemini, openai
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::retry::{RetryConfig, RetryingProvider};
use super::routing::{HasName, promote_preferred};
use super::traits::CodeAnalysisProvider;
use crate::types::ProviderPreference;
use crate::{MimirError, Result};

/// A registered provider and its static priority.
#[derive(Clone)]
pub struct ProviderDescriptor {
    pub provider: Arc<dyn CodeAnalysisProvider>,
    /// Lower number = tried earlier.
    pub priority: u32,
}

impl HasName for ProviderDescriptor {
    fn name(&self) -> &str {
        self.provider.name()
    }
}

impl std::fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("name", &self.provider.name())
            .field("priority", &self.priority)
            .field("available", &self.provider.is_available())
            .finish()
    }
}

/// Snapshot of which providers are configured and usable.
///
/// Serialized as-is by the `/providers` route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    /// Available provider names, in priority order.
    pub available_providers: Vec<String>,
    /// Every registered provider and whether it is available.
    pub provider_configs: BTreeMap<String, bool>,
}

/// Registry of providers in priority order.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Default)]
pub struct ProviderRegistry {
    entries: Vec<ProviderDescriptor>,
    retry_config: Option<RetryConfig>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retry configuration.
    ///
    /// Providers registered after this call are wrapped in
    /// [`RetryingProvider`].
    pub fn set_retry_config(&mut self, config: RetryConfig) {
        self.retry_config = Some(config);
    }

    /// Register a provider with the given priority.
    ///
    /// Entries stay sorted ascending by priority; equal priorities keep
    /// registration order. Names must be unique ignoring case.
    pub fn register(
        &mut self,
        provider: Arc<dyn CodeAnalysisProvider>,
        priority: u32,
    ) -> Result<()> {
        let name = provider.name();
        if self
            .entries
            .iter()
            .any(|e| e.provider.name().eq_ignore_ascii_case(name))
        {
            return Err(MimirError::Configuration(format!(
                "provider '{name}' is already registered"
            )));
        }

        debug!(
            provider = name,
            priority,
            available = provider.is_available(),
            "registering provider"
        );

        let provider = self.maybe_wrap(provider);
        // Insert after every entry with priority <= ours: a stable insertion sort.
        let idx = self.entries.partition_point(|e| e.priority <= priority);
        self.entries.insert(idx, ProviderDescriptor { provider, priority });
        Ok(())
    }

    /// Ordered candidates for one invocation.
    ///
    /// Unavailable providers are filtered out; a named preference that
    /// matches an available provider is promoted to index 0.
    pub fn candidates(
        &self,
        preference: &ProviderPreference,
    ) -> Vec<Arc<dyn CodeAnalysisProvider>> {
        let mut available: Vec<Arc<dyn CodeAnalysisProvider>> = self
            .entries
            .iter()
            .filter(|e| e.provider.is_available())
            .map(|e| Arc::clone(&e.provider))
            .collect();

        if let Some(preferred) = preference.name() {
            promote_preferred(&mut available, preferred);
        }
        available
    }

    /// All registered descriptors, in priority order.
    pub fn descriptors(&self) -> &[ProviderDescriptor] {
        &self.entries
    }

    /// All registered provider names, in priority order.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.provider.name().to_string())
            .collect()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current availability of every registered provider.
    pub fn status(&self) -> ProviderStatus {
        let mut available_providers = Vec::new();
        let mut provider_configs = BTreeMap::new();
        for entry in &self.entries {
            let name = entry.provider.name().to_string();
            let available = entry.provider.is_available();
            if available {
                available_providers.push(name.clone());
            }
            provider_configs.insert(name, available);
        }
        ProviderStatus {
            available_providers,
            provider_configs,
        }
    }

    fn maybe_wrap(&self, provider: Arc<dyn CodeAnalysisProvider>) -> Arc<dyn CodeAnalysisProvider> {
        match &self.retry_config {
            Some(config) => Arc::new(RetryingProvider::new(provider, config.clone())),
            None => provider,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
