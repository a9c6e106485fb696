//! Input size limits and the checks that enforce them.

use serde::Deserialize;

use crate::{MimirError, Result};

/// Default upper bound on submitted code, in characters.
pub const DEFAULT_MAX_CODE_CHARS: usize = 50_000;
/// Default upper bound on improvement context, in characters.
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 2_000;
/// Default upper bound on the number of results fed into a report.
pub const DEFAULT_MAX_REPORT_RESULTS: usize = 50;

/// Size bounds applied before a request reaches the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RequestLimits {
    #[serde(default = "default_max_code_chars")]
    pub max_code_chars: usize,
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
    #[serde(default = "default_max_report_results")]
    pub max_report_results: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_code_chars: DEFAULT_MAX_CODE_CHARS,
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
            max_report_results: DEFAULT_MAX_REPORT_RESULTS,
        }
    }
}

fn default_max_code_chars() -> usize {
    DEFAULT_MAX_CODE_CHARS
}

fn default_max_context_chars() -> usize {
    DEFAULT_MAX_CONTEXT_CHARS
}

fn default_max_report_results() -> usize {
    DEFAULT_MAX_REPORT_RESULTS
}

impl RequestLimits {
    /// Code must be non-blank and within `max_code_chars`.
    pub fn check_code(&self, code: &str) -> Result<()> {
        if code.trim().is_empty() {
            return Err(MimirError::Validation(
                "Code is required and must be a non-empty string".to_string(),
            ));
        }
        if code.chars().count() > self.max_code_chars {
            return Err(MimirError::Validation(format!(
                "Code exceeds maximum length of {} characters",
                self.max_code_chars
            )));
        }
        Ok(())
    }

    pub fn check_context(&self, context: &str) -> Result<()> {
        if context.chars().count() > self.max_context_chars {
            return Err(MimirError::Validation(format!(
                "Context exceeds maximum length of {} characters",
                self.max_context_chars
            )));
        }
        Ok(())
    }

    /// Report input must hold at least one and at most `max_report_results` entries.
    pub fn check_report_results(&self, count: usize) -> Result<()> {
        if count == 0 {
            return Err(MimirError::Validation(
                "Analysis results are required and must be a non-empty array".to_string(),
            ));
        }
        if count > self.max_report_results {
            return Err(MimirError::Validation(format!(
                "Too many analysis results (maximum {})",
                self.max_report_results
            )));
        }
        Ok(())
    }
}
