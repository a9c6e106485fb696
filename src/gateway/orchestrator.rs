//! FallbackOrchestrator - runs one operation across the candidate chain
//!
//! Candidates come from the [`ProviderRegistry`] in priority order (with a
//! preferred provider promoted to the front). They are tried one at a time;
//! the first success wins and the remaining candidates are never invoked.
//!
//! # Failure handling
//!
//! Every failure advances to the next candidate, whatever its kind. Rate
//! limits have already been retried inside the provider's
//! [`RetryingProvider`](crate::providers::RetryingProvider) by the time
//! they reach this loop. A provider that lacks the operation is recorded as
//! an `Unsupported` failure without being invoked.
//!
//! # Cancellation
//!
//! All work happens inside the returned future. Dropping it (client
//! disconnect, request timeout) stops the in-flight provider call and any
//! backoff sleep, and no further candidates are attempted.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::providers::{CodeAnalysisProvider, ProviderRegistry, ProviderStatus};
use crate::telemetry;
use crate::traits::CodeAnalysisGateway;
use crate::types::{
    AnalysisRequest, Attributed, ExplainRequest, ImproveRequest, Operation, OperationOutcome,
    OutcomeMetadata, ProviderPreference, ReportRequest,
};
use crate::{MimirError, Result};

/// Language label used in report metadata, which spans many inputs.
const REPORT_LANGUAGE: &str = "multiple";

/// Gateway that tries registered providers in order until one succeeds.
pub struct FallbackOrchestrator {
    registry: ProviderRegistry,
}

impl FallbackOrchestrator {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Run `f` against each candidate until one succeeds.
    ///
    /// Returns the first success tagged with the provider that produced it,
    /// [`MimirError::NoProvider`] when no provider is available, or
    /// [`MimirError::Exhausted`] carrying the last failure.
    pub async fn execute<T, F, Fut>(
        &self,
        operation: Operation,
        preference: &ProviderPreference,
        f: F,
    ) -> Result<Attributed<T>>
    where
        F: Fn(Arc<dyn CodeAnalysisProvider>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let start = Instant::now();
        let candidates = self.registry.candidates(preference);
        let total = candidates.len();

        if total == 0 {
            warn!(operation = operation.as_str(), "no providers available");
            Self::record_request(operation, "none", start, false);
            return Err(MimirError::NoProvider);
        }

        let mut last_failure: Option<(String, MimirError)> = None;

        for (idx, provider) in candidates.into_iter().enumerate() {
            let name = provider.name().to_string();

            let error = if !provider.capabilities().supports(operation) {
                info!(
                    provider = %name,
                    operation = operation.as_str(),
                    "provider does not support operation, skipping permanently"
                );
                Self::record_attempt(&name, operation, "unsupported");
                MimirError::Unsupported(operation)
            } else {
                debug!(
                    provider = %name,
                    operation = operation.as_str(),
                    attempt = idx + 1,
                    candidates = total,
                    "trying provider"
                );
                match f(provider).await {
                    Ok(value) => {
                        info!(
                            provider = %name,
                            operation = operation.as_str(),
                            elapsed_ms = start.elapsed().as_millis() as u64,
                            "provider succeeded"
                        );
                        Self::record_attempt(&name, operation, "ok");
                        Self::record_request(operation, &name, start, true);
                        return Ok(Attributed {
                            value,
                            provider: name,
                        });
                    }
                    Err(e) => {
                        warn!(
                            provider = %name,
                            operation = operation.as_str(),
                            kind = ?e.kind(),
                            error = %e,
                            "provider failed"
                        );
                        Self::record_attempt(&name, operation, "error");
                        e
                    }
                }
            };

            if idx + 1 < total {
                metrics::counter!(telemetry::FALLBACKS_TOTAL,
                    "provider" => name.clone(),
                    "operation" => operation.as_str(),
                )
                .increment(1);
            }
            last_failure = Some((name, error));
        }

        Self::record_request(operation, "none", start, false);
        match last_failure {
            Some((provider, source)) => {
                warn!(
                    operation = operation.as_str(),
                    last_provider = %provider,
                    "all providers failed"
                );
                Err(MimirError::Exhausted {
                    provider,
                    source: Box::new(source),
                })
            }
            None => Err(MimirError::NoProvider),
        }
    }

    // ========================================================================
    // Metrics recording
    // ========================================================================

    fn record_attempt(provider: &str, operation: Operation, status: &'static str) {
        metrics::counter!(telemetry::ATTEMPTS_TOTAL,
            "provider" => provider.to_owned(),
            "operation" => operation.as_str(),
            "status" => status,
        )
        .increment(1);
    }

    /// Record whole-invocation outcome metrics (counter + histogram).
    fn record_request(operation: Operation, provider: &str, start: Instant, ok: bool) {
        let status = if ok { "ok" } else { "error" };
        let elapsed = start.elapsed().as_secs_f64();
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "provider" => provider.to_owned(),
            "operation" => operation.as_str(),
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "operation" => operation.as_str(),
            "status" => status,
        )
        .record(elapsed);
    }
}

fn into_outcome(result: Attributed<String>, metadata: OutcomeMetadata) -> OperationOutcome {
    OperationOutcome {
        analysis: result.value,
        provider: result.provider,
        metadata,
    }
}

#[async_trait]
impl CodeAnalysisGateway for FallbackOrchestrator {
    #[instrument(skip(self, request), fields(
        operation = "analyze",
        language = %request.language,
        analysis_type = %request.analysis_type,
    ))]
    async fn analyze(&self, request: &AnalysisRequest) -> Result<OperationOutcome> {
        let code = request.code.as_str();
        let language = request.language;
        let analysis_type = request.analysis_type;

        let result = self
            .execute(
                Operation::Analyze,
                &request.preferred_provider,
                move |provider| async move {
                    provider.analyze_code(code, language, analysis_type).await
                },
            )
            .await?;

        Ok(into_outcome(
            result,
            OutcomeMetadata::now(language.as_str(), analysis_type.as_str()),
        ))
    }

    #[instrument(skip(self, request), fields(operation = "explain", language = %request.language))]
    async fn explain(&self, request: &ExplainRequest) -> Result<OperationOutcome> {
        let code = request.code.as_str();
        let language = request.language;

        let result = self
            .execute(
                Operation::Explain,
                &ProviderPreference::Auto,
                move |provider| async move { provider.explain_code(code, language).await },
            )
            .await?;

        Ok(into_outcome(
            result,
            OutcomeMetadata::now(language.as_str(), "explanation"),
        ))
    }

    #[instrument(skip(self, request), fields(
        operation = "improve",
        language = %request.language,
        has_context = request.context.is_some(),
    ))]
    async fn improve(&self, request: &ImproveRequest) -> Result<OperationOutcome> {
        let code = request.code.as_str();
        let language = request.language;
        let context = request.context.as_deref();

        let result = self
            .execute(
                Operation::Improve,
                &ProviderPreference::Auto,
                move |provider| async move {
                    provider.suggest_improvements(code, language, context).await
                },
            )
            .await?;

        Ok(into_outcome(
            result,
            OutcomeMetadata::now(language.as_str(), "improvements"),
        ))
    }

    #[instrument(skip(self, request), fields(
        operation = "report",
        results = request.results.len(),
    ))]
    async fn report(&self, request: &ReportRequest) -> Result<OperationOutcome> {
        let results = request.results.as_slice();
        let project_info = &request.project_info;

        let result = self
            .execute(
                Operation::Report,
                &ProviderPreference::Auto,
                move |provider| async move {
                    provider.generate_report(results, project_info).await
                },
            )
            .await?;

        Ok(into_outcome(
            result,
            OutcomeMetadata::now(REPORT_LANGUAGE, "report"),
        ))
    }

    fn provider_status(&self) -> ProviderStatus {
        self.registry.status()
    }

    fn provider_names(&self) -> Vec<String> {
        self.registry.names()
    }
}
