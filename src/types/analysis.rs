//! Analysis kinds and the operations a provider can be asked to perform.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Focus of an `/analyze` request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    #[default]
    General,
    Security,
    Performance,
    Maintainability,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::General => "general",
            AnalysisType::Security => "security",
            AnalysisType::Performance => "performance",
            AnalysisType::Maintainability => "maintainability",
        }
    }

    /// Parse case-insensitively; anything unrecognised becomes `General`.
    pub fn normalize(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "security" => AnalysisType::Security,
            "performance" => AnalysisType::Performance,
            "maintainability" => AnalysisType::Maintainability,
            _ => AnalysisType::General,
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the four operations routed through the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Analyze,
    Explain,
    Improve,
    Report,
}

impl Operation {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Analyze => "analyze",
            Operation::Explain => "explain",
            Operation::Improve => "improve",
            Operation::Report => "report",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
