//! HTTP server for mimird.
//!
//! This module provides:
//! - The axum service over a [`CodeAnalysisGateway`](crate::CodeAnalysisGateway) (`service`)
//! - Lenient body → request conversions (`convert`)
//! - Configuration and secrets loading (`config`)

pub mod config;
pub mod convert;
pub mod service;

pub use config::{Config, Environment, Secrets};
pub use service::{GENERIC_FAILURE_MESSAGE, ServiceOptions, derived_body_limit, router};
