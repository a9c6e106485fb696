//! Core CodeAnalysisGateway trait

use async_trait::async_trait;

use crate::providers::ProviderStatus;
use crate::types::{
    AnalysisRequest, ExplainRequest, ImproveRequest, OperationOutcome, ReportRequest,
};
use crate::Result;

/// The surface the HTTP façade (or any embedding application) talks to.
///
/// Each operation returns exactly one complete outcome with provenance, or
/// one aggregate failure. Requests are expected to be validated already.
#[async_trait]
pub trait CodeAnalysisGateway: Send + Sync {
    /// Analyze code for issues, scored by the requested analysis type.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<OperationOutcome>;

    /// Explain what a piece of code does.
    async fn explain(&self, request: &ExplainRequest) -> Result<OperationOutcome>;

    /// Suggest improvements, optionally steered by caller context.
    async fn improve(&self, request: &ImproveRequest) -> Result<OperationOutcome>;

    /// Aggregate earlier analysis outputs into one report.
    async fn report(&self, request: &ReportRequest) -> Result<OperationOutcome>;

    /// Availability of every registered provider.
    fn provider_status(&self) -> ProviderStatus;

    /// Registered provider names in priority order.
    ///
    /// Used to resolve `preferredProvider` input.
    fn provider_names(&self) -> Vec<String>;
}
