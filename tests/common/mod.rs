//! Shared mock providers for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use mimir::{
    AnalysisType, CodeAnalysisProvider, Language, MimirError, ProviderCapabilities, Result,
};

/// What a mock does on one call.
#[derive(Clone)]
pub enum Step {
    Reply(String),
    Fail(fn() -> MimirError),
    /// Never completes.
    Hang,
}

/// Shared record of which providers were invoked, in order.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn logged(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Mock provider with a scripted sequence of outcomes and call counters.
pub struct MockProvider {
    name: String,
    available: bool,
    capabilities: ProviderCapabilities,
    script: Mutex<VecDeque<Step>>,
    fallback: Step,
    calls: AtomicU32,
    call_times: Mutex<Vec<Instant>>,
    log: Option<CallLog>,
}

impl MockProvider {
    fn new(name: &str, fallback: Step) -> Self {
        Self {
            name: name.to_string(),
            available: true,
            capabilities: ProviderCapabilities::full(),
            script: Mutex::new(VecDeque::new()),
            fallback,
            calls: AtomicU32::new(0),
            call_times: Mutex::new(Vec::new()),
            log: None,
        }
    }

    /// Always succeeds with `text`.
    pub fn replying(name: &str, text: impl Into<String>) -> Self {
        Self::new(name, Step::Reply(text.into()))
    }

    /// Always fails with the error built by `error`.
    pub fn failing(name: &str, error: fn() -> MimirError) -> Self {
        Self::new(name, Step::Fail(error))
    }

    /// Never completes.
    pub fn hanging(name: &str) -> Self {
        Self::new(name, Step::Hang)
    }

    /// Queue a step to run before the fallback behaviour.
    pub fn then(self, step: Step) -> Self {
        self.script.lock().unwrap().push_back(step);
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Drop report support.
    pub fn without_report(mut self) -> Self {
        self.capabilities = ProviderCapabilities::core();
        self
    }

    pub fn with_log(mut self, log: &CallLog) -> Self {
        self.log = Some(Arc::clone(log));
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Gaps between consecutive calls, on the tokio clock.
    pub fn gaps(&self) -> Vec<Duration> {
        let times = self.call_times.lock().unwrap();
        times.windows(2).map(|w| w[1] - w[0]).collect()
    }

    async fn respond(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.call_times.lock().unwrap().push(Instant::now());
        if let Some(log) = &self.log {
            log.lock().unwrap().push(self.name.clone());
        }

        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match step {
            Step::Reply(text) => Ok(text),
            Step::Fail(error) => Err(error()),
            Step::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl CodeAnalysisProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn analyze_code(&self, _: &str, _: Language, _: AnalysisType) -> Result<String> {
        self.respond().await
    }

    async fn explain_code(&self, _: &str, _: Language) -> Result<String> {
        self.respond().await
    }

    async fn suggest_improvements(&self, _: &str, _: Language, _: Option<&str>) -> Result<String> {
        self.respond().await
    }

    async fn generate_report(&self, _: &[Value], _: &Value) -> Result<String> {
        self.respond().await
    }
}

// ============================================================================
// Error constructors (fn pointers for Step::Fail)
// ============================================================================

pub fn rate_limited() -> MimirError {
    MimirError::RateLimited { retry_after: None }
}

pub fn unauthorized() -> MimirError {
    MimirError::AuthenticationFailed
}

pub fn upstream(message: &str) -> MimirError {
    MimirError::Api {
        status: 500,
        message: message.to_string(),
    }
}
