//! HTTP service over any [`CodeAnalysisGateway`].
//!
//! Every response uses one envelope:
//! - success: `{"success": true, "data": ...}`
//! - failure: `{"success": false, "error": "...", "message": "..."}`
//!
//! Validation failures, an oversized body included, are 400 with the
//! specific message. Everything else is 500, a request that outlives
//! `request_timeout` included; in production the message is replaced by a
//! generic one.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use super::config::Environment;
use super::convert;
use crate::traits::CodeAnalysisGateway;
use crate::types::RequestLimits;
use crate::version::VersionInfo;
use crate::MimirError;

/// Message shown instead of upstream detail in production.
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred while processing your request";

/// Headroom for JSON framing and the small fields.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// Worst-case bytes per character once JSON-escaped (`\uXXXX`).
const ESCAPED_CHAR_BYTES: usize = 6;

/// Allowance per entry of `analysisResults`.
const REPORT_RESULT_BYTES: usize = 64 * 1024;

/// Knobs for [`router`].
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub limits: RequestLimits,
    pub environment: Environment,
    /// Whole-request budget, candidates and backoff included.
    pub request_timeout: Duration,
    /// Raw body cap in bytes; `None` derives it from `limits`.
    pub max_body_bytes: Option<usize>,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            limits: RequestLimits::default(),
            environment: Environment::default(),
            request_timeout: Duration::from_secs(120),
            max_body_bytes: None,
        }
    }
}

impl ServiceOptions {
    /// The body cap in effect.
    pub fn body_limit(&self) -> usize {
        self.max_body_bytes.unwrap_or_else(|| derived_body_limit(&self.limits))
    }
}

/// Smallest cap that admits every body the request limits accept.
///
/// Code and context may be escaped character by character; a report may
/// carry `max_report_results` entries of up to [`REPORT_RESULT_BYTES`] each.
pub fn derived_body_limit(limits: &RequestLimits) -> usize {
    let code = limits
        .max_code_chars
        .saturating_add(limits.max_context_chars)
        .saturating_mul(ESCAPED_CHAR_BYTES);
    let report = limits.max_report_results.saturating_mul(REPORT_RESULT_BYTES);
    code.max(report).saturating_add(BODY_LIMIT_SLACK)
}

struct AppState<G> {
    gateway: Arc<G>,
    limits: RequestLimits,
    environment: Environment,
    request_timeout: Duration,
    body_limit: usize,
}

/// Build the axum router for a gateway.
pub fn router<G>(gateway: Arc<G>, options: ServiceOptions) -> Router
where
    G: CodeAnalysisGateway + 'static,
{
    let body_limit = options.body_limit();
    let state = Arc::new(AppState {
        gateway,
        limits: options.limits,
        environment: options.environment,
        request_timeout: options.request_timeout,
        body_limit,
    });

    Router::new()
        .route("/analyze", post(analyze::<G>))
        .route("/explain", post(explain::<G>))
        .route("/improve", post(improve::<G>))
        .route("/report", post(report::<G>))
        .route("/providers", get(providers::<G>))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Envelope
// ============================================================================

fn success<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(json!({ "success": true, "data": data }))).into_response()
}

/// A failed request, rendered into the error envelope.
struct ApiError {
    error: MimirError,
    environment: Environment,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, label, message) = if self.error.is_validation() {
            warn!(error = %self.error, "rejected request");
            (
                StatusCode::BAD_REQUEST,
                "Validation Error",
                self.error.to_string(),
            )
        } else {
            error!(error = %self.error, "request failed");
            let message = if self.environment.is_production() {
                GENERIC_FAILURE_MESSAGE.to_string()
            } else {
                self.error.to_string()
            };
            (StatusCode::INTERNAL_SERVER_ERROR, "Analysis Failed", message)
        };

        (
            status,
            Json(json!({ "success": false, "error": label, "message": message })),
        )
            .into_response()
    }
}

impl<G> AppState<G> {
    fn fail(&self, error: MimirError) -> Response {
        ApiError {
            error,
            environment: self.environment,
        }
        .into_response()
    }

    /// Decode the buffered body, turning extractor rejections into
    /// validation errors.
    fn read_body(
        &self,
        body: Result<Bytes, BytesRejection>,
    ) -> crate::Result<Map<String, Value>> {
        match body {
            Ok(bytes) => convert::parse_body(&bytes),
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                Err(MimirError::Validation(format!(
                    "Request body exceeds maximum size of {} bytes",
                    self.body_limit
                )))
            }
            Err(rejection) => {
                debug!(error = %rejection.body_text(), "failed to read request body");
                Err(MimirError::Validation(format!(
                    "Failed to read request body: {}",
                    rejection.body_text()
                )))
            }
        }
    }

    /// Await a gateway call within the request budget and render it.
    async fn respond<T, F>(&self, call: F) -> Response
    where
        T: Serialize,
        F: Future<Output = crate::Result<T>>,
    {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(Ok(data)) => success(data),
            Ok(Err(e)) => self.fail(e),
            Err(_) => {
                warn!(
                    timeout_ms = self.request_timeout.as_millis() as u64,
                    "request exceeded its time budget"
                );
                self.fail(MimirError::Timeout)
            }
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn analyze<G: CodeAnalysisGateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let known = state.gateway.provider_names();
    let request = match state
        .read_body(body)
        .and_then(|body| convert::analysis_request(&body, &state.limits, &known))
    {
        Ok(request) => request,
        Err(e) => return state.fail(e),
    };
    state.respond(state.gateway.analyze(&request)).await
}

async fn explain<G: CodeAnalysisGateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request = match state
        .read_body(body)
        .and_then(|body| convert::explain_request(&body, &state.limits))
    {
        Ok(request) => request,
        Err(e) => return state.fail(e),
    };
    state.respond(state.gateway.explain(&request)).await
}

async fn improve<G: CodeAnalysisGateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request = match state
        .read_body(body)
        .and_then(|body| convert::improve_request(&body, &state.limits))
    {
        Ok(request) => request,
        Err(e) => return state.fail(e),
    };
    state.respond(state.gateway.improve(&request)).await
}

async fn report<G: CodeAnalysisGateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request = match state
        .read_body(body)
        .and_then(|body| convert::report_request(&body, &state.limits))
    {
        Ok(request) => request,
        Err(e) => return state.fail(e),
    };
    state.respond(state.gateway.report(&request)).await
}

async fn providers<G: CodeAnalysisGateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
) -> Response {
    success(state.gateway.provider_status())
}

async fn health() -> Response {
    let info = VersionInfo::current();
    success(json!({ "status": "ok", "version": info.version, "build": info.build }))
}
