//! Shared HTTP plumbing for the API adapters.
//!
//! Status codes and error bodies are turned into [`MimirError`] variants
//! here, at the boundary, so nothing downstream ever matches on message text.

use std::time::Duration;

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{MimirError, Result};

/// Default per-call timeout for remote requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Sampling temperature sent with every prompt.
pub(crate) const TEMPERATURE: f32 = 0.3;

/// Output token budget sent with every prompt.
pub(crate) const MAX_OUTPUT_TOKENS: u32 = 4096;

/// Error-body status/code/type values that mean "rate limited or out of quota".
const RATE_LIMIT_MARKERS: &[&str] = &[
    "RESOURCE_EXHAUSTED",
    "insufficient_quota",
    "rate_limit_exceeded",
    "rate_limit_error",
];

/// Map a transport-level `reqwest` failure.
pub(crate) fn transport_error(err: reqwest::Error) -> MimirError {
    if err.is_timeout() {
        MimirError::Timeout
    } else if err.is_decode() {
        MimirError::MalformedResponse(err.to_string())
    } else {
        MimirError::Http(err.to_string())
    }
}

/// Pass through a 2xx response, otherwise read the body and classify it.
pub(crate) async fn check_status(provider: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs);
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            debug!(provider, status = status.as_u16(), error = %e, "failed to read error body");
            return Err(unreadable_body_failure(
                provider,
                status.as_u16(),
                retry_after,
                &e.to_string(),
            ));
        }
    };

    Err(classify_failure(provider, status.as_u16(), retry_after, &body))
}

/// Classify a non-2xx answer whose body could not be read.
///
/// The status still decides the kind; the read failure replaces the
/// provider message.
pub(crate) fn unreadable_body_failure(
    provider: &str,
    status: u16,
    retry_after: Option<Duration>,
    reason: &str,
) -> MimirError {
    match classify_failure(provider, status, retry_after, "") {
        MimirError::Api { status, .. } => MimirError::Api {
            status,
            message: format!("{provider} API returned status {status}, body unreadable: {reason}"),
        },
        other => other,
    }
}

/// Decode a successful JSON body.
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes).map_err(|e| MimirError::MalformedResponse(e.to_string()))
}

/// Turn a non-2xx status and its body into a structured error.
pub(crate) fn classify_failure(
    provider: &str,
    status: u16,
    retry_after: Option<Duration>,
    body: &str,
) -> MimirError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().map(|v| v.get("error").unwrap_or(v));

    let field = |name: &str| {
        error
            .and_then(|e| e.get(name))
            .and_then(Value::as_str)
            .map(str::to_owned)
    };

    let rate_limited = status == 429
        || ["status", "code", "type"]
            .iter()
            .filter_map(|name| field(*name))
            .any(|marker| RATE_LIMIT_MARKERS.contains(&marker.as_str()));

    if rate_limited {
        return MimirError::RateLimited { retry_after };
    }

    match status {
        401 | 403 => MimirError::AuthenticationFailed,
        _ => MimirError::Api {
            status,
            message: field("message")
                .unwrap_or_else(|| format!("{provider} API returned status {status}")),
        },
    }
}
