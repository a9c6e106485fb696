//! Telemetry metric name constants.
//!
//! Centralised metric names for mimir operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `mimir_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider`: provider name (e.g. "gemini", "openai")
//! - `operation`: operation invoked ("analyze", "explain", "improve", "report")
//! - `status`: outcome: "ok", "error" or "unsupported"

/// Total orchestrated requests (one per operation invocation).
///
/// Labels: `provider` (winning provider, or "none"), `operation`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "mimir_requests_total";

/// Whole-invocation duration in seconds, across every candidate tried.
///
/// Labels: `operation`, `status`.
pub const REQUEST_DURATION_SECONDS: &str = "mimir_request_duration_seconds";

/// Total per-provider attempts made by the orchestrator.
///
/// Labels: `provider`, `operation`, `status` ("ok" | "error" | "unsupported").
pub const ATTEMPTS_TOTAL: &str = "mimir_attempts_total";

/// Total retry attempts on a single provider (not counting the initial request).
///
/// Labels: `provider`, `operation`.
pub const RETRIES_TOTAL: &str = "mimir_retries_total";

/// Total times the orchestrator moved past a failed provider.
///
/// Labels: `provider` (the provider that failed), `operation`.
pub const FALLBACKS_TOTAL: &str = "mimir_fallbacks_total";
