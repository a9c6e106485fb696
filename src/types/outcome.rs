//! Orchestration results.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Value produced by one provider, tagged with that provider's name.
#[derive(Debug, Clone, PartialEq)]
pub struct Attributed<T> {
    pub value: T,
    pub provider: String,
}

/// Metadata attached to every successful outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeMetadata {
    pub language: String,
    /// Analysis type for `/analyze`, operation kind for everything else.
    pub analysis_type: String,
    /// RFC 3339 UTC timestamp, millisecond precision.
    pub timestamp: String,
}

impl OutcomeMetadata {
    /// Metadata stamped with the current time.
    pub fn now(language: impl Into<String>, analysis_type: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            analysis_type: analysis_type.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// A single successful orchestration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOutcome {
    /// Raw provider text (often markdown wrapping a JSON block).
    pub analysis: String,
    /// Provider that produced `analysis`.
    pub provider: String,
    pub metadata: OutcomeMetadata,
}
