//! Validated request value objects.
//!
//! Each request is built once per inbound call and never mutated after
//! validation. Builders follow the `with_*` style so tests can assemble
//! requests without going through the HTTP layer.

use serde_json::Value;

use super::{AnalysisType, Language};

/// Which provider the caller would like tried first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProviderPreference {
    /// Plain priority order.
    #[default]
    Auto,
    /// Promote the named provider (compared case-insensitively).
    Named(String),
}

impl ProviderPreference {
    pub fn named(name: impl Into<String>) -> Self {
        ProviderPreference::Named(name.into())
    }

    /// Provider name, or `None` for `Auto`.
    pub fn name(&self) -> Option<&str> {
        match self {
            ProviderPreference::Auto => None,
            ProviderPreference::Named(name) => Some(name),
        }
    }

    /// Resolve raw input against the registered provider names.
    ///
    /// `"auto"` and every unknown name resolve to `Auto`; a known name
    /// resolves to its registered spelling.
    pub fn resolve<S: AsRef<str>>(raw: &str, known: &[S]) -> Self {
        let raw = raw.trim();
        known
            .iter()
            .map(AsRef::as_ref)
            .find(|name| name.eq_ignore_ascii_case(raw))
            .map(|name| ProviderPreference::Named(name.to_string()))
            .unwrap_or_default()
    }
}

/// A request to analyze a snippet of code.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub code: String,
    pub language: Language,
    pub analysis_type: AnalysisType,
    pub preferred_provider: ProviderPreference,
}

impl AnalysisRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: Language::default(),
            analysis_type: AnalysisType::default(),
            preferred_provider: ProviderPreference::default(),
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_analysis_type(mut self, analysis_type: AnalysisType) -> Self {
        self.analysis_type = analysis_type;
        self
    }

    pub fn with_preferred_provider(mut self, preference: ProviderPreference) -> Self {
        self.preferred_provider = preference;
        self
    }
}

/// A request to explain what code does.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainRequest {
    pub code: String,
    pub language: Language,
}

impl ExplainRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: Language::default(),
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}

/// A request for improvement suggestions, optionally steered by free text.
#[derive(Debug, Clone, PartialEq)]
pub struct ImproveRequest {
    pub code: String,
    pub language: Language,
    pub context: Option<String>,
}

impl ImproveRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: Language::default(),
            context: None,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// A request to aggregate earlier analysis outputs into a report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub results: Vec<Value>,
    /// Free-form project description; an empty object when absent.
    pub project_info: Value,
}

impl ReportRequest {
    pub fn new(results: Vec<Value>) -> Self {
        Self {
            results,
            project_info: Value::Object(Default::default()),
        }
    }

    pub fn with_project_info(mut self, project_info: Value) -> Self {
        self.project_info = project_info;
        self
    }
}
