//! The uniform adapter contract every remote AI service is wrapped behind.
//!
//! Adapters translate the four operations into one service's request and
//! response shapes, and normalize failures into [`MimirError`] variants the
//! orchestrator can classify without reading message text.
//!
//! # Optional capabilities
//!
//! Report generation is optional. An adapter that lacks it leaves
//! [`ProviderCapabilities::report`] false and keeps the default
//! [`generate_report`](CodeAnalysisProvider::generate_report), which fails
//! with [`MimirError::Unsupported`]. The retry decorator never retries that
//! error and the orchestrator skips such providers before invoking them.
//!
//! [`MimirError`]: crate::MimirError
//! [`MimirError::Unsupported`]: crate::MimirError::Unsupported

use async_trait::async_trait;
use serde_json::Value;

use crate::types::{AnalysisType, Language, Operation, ProviderCapabilities};
use crate::{MimirError, Result};

/// One remote AI service.
#[async_trait]
pub trait CodeAnalysisProvider: Send + Sync {
    /// Provider name for routing, logging and provenance.
    fn name(&self) -> &str;

    /// Operations this provider implements.
    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::core()
    }

    /// Whether a credential is configured.
    ///
    /// Pure: no I/O, safe to call before first use.
    fn is_available(&self) -> bool;

    /// Analyze code with the given focus. Returns raw response text.
    async fn analyze_code(
        &self,
        code: &str,
        language: Language,
        analysis_type: AnalysisType,
    ) -> Result<String>;

    /// Explain what code does in plain language.
    async fn explain_code(&self, code: &str, language: Language) -> Result<String>;

    /// Suggest improvements, optionally steered by free-text context.
    async fn suggest_improvements(
        &self,
        code: &str,
        language: Language,
        context: Option<&str>,
    ) -> Result<String>;

    /// Aggregate earlier analysis outputs into a narrative report.
    async fn generate_report(&self, _results: &[Value], _project_info: &Value) -> Result<String> {
        Err(MimirError::Unsupported(Operation::Report))
    }
}
