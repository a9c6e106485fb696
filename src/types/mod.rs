//! Public types for the Mimir API.

mod analysis;
mod capabilities;
mod language;
mod outcome;
mod request;
mod validation;

pub use analysis::{AnalysisType, Operation};
pub use capabilities::ProviderCapabilities;
pub use language::Language;
pub use outcome::{Attributed, OperationOutcome, OutcomeMetadata};
pub use request::{
    AnalysisRequest, ExplainRequest, ImproveRequest, ProviderPreference, ReportRequest,
};
pub use validation::{
    DEFAULT_MAX_CODE_CHARS, DEFAULT_MAX_CONTEXT_CHARS, DEFAULT_MAX_REPORT_RESULTS, RequestLimits,
};
