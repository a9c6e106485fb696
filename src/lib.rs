//! Mimir - multi-provider AI code analysis with ordered fallback
//!
//! This crate routes code-analysis requests (analyze, explain, improve,
//! report) across several AI services. Providers are tried in priority
//! order, optionally with a caller-preferred provider first; the first
//! success wins and carries the name of the provider that produced it.
//!
//! # Example
//!
//! ```rust,no_run
//! use mimir::{AnalysisRequest, AnalysisType, CodeAnalysisGateway, Language, Mimir};
//!
//! #[tokio::main]
//! async fn main() -> mimir::Result<()> {
//!     let gateway = Mimir::builder()
//!         .gemini("your-gemini-key")
//!         .openai("sk-your-openai-key")
//!         .build()?;
//!
//!     let request = AnalysisRequest::new("console.log(1)")
//!         .with_language(Language::JavaScript)
//!         .with_analysis_type(AnalysisType::Security);
//!
//!     let outcome = gateway.analyze(&request).await?;
//!     println!("{} says: {}", outcome.provider, outcome.analysis);
//!     Ok(())
//! }
//! ```
//!
//! # Custom providers
//!
//! Anything implementing [`CodeAnalysisProvider`] can join the chain via
//! [`MimirBuilder::provider`].

pub mod error;
pub mod gateway;
pub mod providers;
#[cfg(feature = "server")]
pub mod server;
pub mod telemetry;
pub mod traits;
pub mod types;
pub mod version;

// Re-export main types at crate root
pub use error::{MimirError, ProviderErrorKind, Result};
pub use gateway::{FallbackOrchestrator, Mimir, MimirBuilder, ProviderSettings};
pub use providers::{
    CodeAnalysisProvider, ProviderRegistry, ProviderStatus, RetryConfig, RetryingProvider,
};
pub use traits::CodeAnalysisGateway;

// Re-export all types
pub use types::{
    AnalysisRequest, AnalysisType, Attributed, ExplainRequest, ImproveRequest, Language,
    Operation, OperationOutcome, OutcomeMetadata, ProviderCapabilities, ProviderPreference,
    ReportRequest, RequestLimits,
};
