//! Provider capability reporting

use serde::{Deserialize, Serialize};

use super::Operation;

/// Which operations a provider implements.
///
/// Checked by the orchestrator before invoking a provider, so a missing
/// capability is known up front instead of discovered per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    /// Code analysis.
    pub analyze: bool,
    /// Plain-language explanation.
    pub explain: bool,
    /// Improvement suggestions.
    pub improve: bool,
    /// Narrative report over prior results.
    pub report: bool,
}

impl ProviderCapabilities {
    /// Analyze, explain and improve; no report generation.
    pub fn core() -> Self {
        Self {
            analyze: true,
            explain: true,
            improve: true,
            report: false,
        }
    }

    /// Every operation, including report generation.
    pub fn full() -> Self {
        Self {
            report: true,
            ..Self::core()
        }
    }

    pub fn supports(&self, operation: Operation) -> bool {
        match operation {
            Operation::Analyze => self.analyze,
            Operation::Explain => self.explain,
            Operation::Improve => self.improve,
            Operation::Report => self.report,
        }
    }
}

impl Default for ProviderCapabilities {
    fn default() -> Self {
        Self::core()
    }
}
