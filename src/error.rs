//! Mimir error types

use std::time::Duration;

use crate::types::Operation;

/// Mimir error types
#[derive(Debug, thiserror::Error)]
pub enum MimirError {
    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("request timed out")]
    Timeout,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("no API key configured for {0}")]
    MissingCredential(String),

    // Data errors
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("empty response from model")]
    EmptyResponse,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider does not implement this operation at all.
    ///
    /// Permanent: never retried, but the orchestrator still moves on to the
    /// next candidate.
    #[error("provider does not support {0}")]
    Unsupported(Operation),

    // Request errors
    #[error("{0}")]
    Validation(String),

    // Orchestration errors
    #[error("no AI providers available")]
    NoProvider,

    /// Every candidate failed. Carries the last failure for diagnostics.
    #[error("all AI providers failed, last error from {provider}: {source}")]
    Exhausted {
        provider: String,
        #[source]
        source: Box<MimirError>,
    },

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Structured classification of a single provider failure.
///
/// Decided at the adapter boundary, where the status code and body shape
/// are still available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// 429 or a quota/rate-limit body.
    RateLimited,
    /// Bad or missing credential.
    Unauthorized,
    /// Transport failure or timeout.
    NetworkFailure,
    /// Body could not be decoded or carried no text.
    MalformedResponse,
    /// The provider never implements the operation.
    Unsupported,
    /// Any other non-2xx answer.
    Upstream,
}

impl MimirError {
    /// Classify this error, or `None` if it did not come from a provider.
    pub fn kind(&self) -> Option<ProviderErrorKind> {
        match self {
            MimirError::RateLimited { .. } => Some(ProviderErrorKind::RateLimited),
            MimirError::AuthenticationFailed | MimirError::MissingCredential(_) => {
                Some(ProviderErrorKind::Unauthorized)
            }
            MimirError::Http(_) | MimirError::Timeout => Some(ProviderErrorKind::NetworkFailure),
            MimirError::MalformedResponse(_) | MimirError::EmptyResponse | MimirError::Json(_) => {
                Some(ProviderErrorKind::MalformedResponse)
            }
            MimirError::Unsupported(_) => Some(ProviderErrorKind::Unsupported),
            MimirError::Api { .. } => Some(ProviderErrorKind::Upstream),
            MimirError::Validation(_)
            | MimirError::NoProvider
            | MimirError::Exhausted { .. }
            | MimirError::Configuration(_) => None,
        }
    }

    /// Whether the same provider should be retried after a backoff delay.
    ///
    /// Only rate limiting qualifies; every other failure aborts the inner
    /// retry loop immediately.
    pub fn is_retryable(&self) -> bool {
        self.kind() == Some(ProviderErrorKind::RateLimited)
    }

    /// Provider-supplied delay hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            MimirError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Whether this is a caller input problem (HTTP 400).
    pub fn is_validation(&self) -> bool {
        matches!(self, MimirError::Validation(_))
    }
}

/// Result type alias for Mimir operations
pub type Result<T> = std::result::Result<T, MimirError>;
