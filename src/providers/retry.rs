//! Retry configuration, delay calculation, and the provider decorator.
//!
//! Provides [`RetryConfig`] for controlling backoff on rate limits and
//! [`RetryingProvider`], which wraps any [`CodeAnalysisProvider`] so each
//! operation retries the *same* provider before giving up.
//!
//! This inner loop is separate from the orchestrator's fallback loop: an
//! adapter that exhausts its attempts reports one failure, and the
//! orchestrator then moves on to the next candidate.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::traits::CodeAnalysisProvider;
use crate::telemetry;
use crate::types::{AnalysisType, Language, Operation, ProviderCapabilities};
use crate::Result;

/// Configuration for bounded exponential backoff on rate limits.
///
/// ```rust
/// # use mimir::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_attempts(5)
///     .initial_delay(Duration::from_millis(200));
/// assert_eq!(config.delay_for_attempt(2), Duration::from_millis(800));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial request).
    /// 1 = no retry. Default: 3.
    pub max_attempts: u32,
    /// Delay after the first failed attempt. Default: 1s.
    pub initial_delay: Duration,
    /// Maximum delay between retries (caps exponential growth). Default: 30s.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set maximum attempts (including the initial request).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n.max(1);
        self
    }

    /// Set the delay after the first failed attempt.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Calculate the delay after a failed attempt (0-indexed).
    ///
    /// Uses exponential backoff: `initial_delay * 2^attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self
            .initial_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.max_delay)
    }

    /// Calculate the effective delay, respecting provider `retry_after` hints.
    ///
    /// A hint takes precedence over the calculated backoff but is still
    /// capped at `max_delay`.
    pub fn effective_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        retry_after
            .map(|hint| hint.min(self.max_delay))
            .unwrap_or_else(|| self.delay_for_attempt(attempt))
    }
}

// ============================================================================
// Shared retry helper
// ============================================================================

/// Execute an async operation with retry on rate limits.
///
/// Retries errors for which
/// [`MimirError::is_retryable()`](crate::MimirError::is_retryable) holds, up to
/// `config.max_attempts`, sleeping between attempts. Every other error is
/// returned immediately. The sleep is an ordinary tokio timer owned by the
/// returned future, so dropping the future cancels a pending backoff.
pub(crate) async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    provider_name: &str,
    operation: Operation,
    f: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_retryable() && attempt + 1 < config.max_attempts => {
                let delay = config.effective_delay(attempt, e.retry_after());
                metrics::counter!(telemetry::RETRIES_TOTAL,
                    "provider" => provider_name.to_owned(),
                    "operation" => operation.as_str(),
                )
                .increment(1);
                warn!(
                    provider = provider_name,
                    operation = operation.as_str(),
                    attempt = attempt + 1,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    debug!(
                        provider = provider_name,
                        operation = operation.as_str(),
                        attempts = attempt + 1,
                        "retry budget exhausted"
                    );
                }
                return Err(e);
            }
        }
    }
}

// ============================================================================
// RetryingProvider
// ============================================================================

/// Decorator that wraps a [`CodeAnalysisProvider`] with backoff on rate limits.
///
/// Identity, capabilities and availability are delegated untouched, so the
/// registry and the orchestrator see the wrapped provider exactly as before.
pub struct RetryingProvider {
    inner: Arc<dyn CodeAnalysisProvider>,
    config: RetryConfig,
}

impl RetryingProvider {
    /// Wrap a provider with retry logic.
    pub fn new(inner: Arc<dyn CodeAnalysisProvider>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl CodeAnalysisProvider for RetryingProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.inner.capabilities()
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }

    async fn analyze_code(
        &self,
        code: &str,
        language: Language,
        analysis_type: AnalysisType,
    ) -> Result<String> {
        with_retry(&self.config, self.inner.name(), Operation::Analyze, || {
            self.inner.analyze_code(code, language, analysis_type)
        })
        .await
    }

    async fn explain_code(&self, code: &str, language: Language) -> Result<String> {
        with_retry(&self.config, self.inner.name(), Operation::Explain, || {
            self.inner.explain_code(code, language)
        })
        .await
    }

    async fn suggest_improvements(
        &self,
        code: &str,
        language: Language,
        context: Option<&str>,
    ) -> Result<String> {
        with_retry(&self.config, self.inner.name(), Operation::Improve, || {
            self.inner.suggest_improvements(code, language, context)
        })
        .await
    }

    async fn generate_report(&self, results: &[Value], project_info: &Value) -> Result<String> {
        with_retry(&self.config, self.inner.name(), Operation::Report, || {
            self.inner.generate_report(results, project_info)
        })
        .await
    }
}
