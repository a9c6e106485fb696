//! Gateway implementations

mod builder;
mod orchestrator;

pub use builder::{
    ANTHROPIC_PRIORITY, GEMINI_PRIORITY, Mimir, MimirBuilder, OPENAI_PRIORITY, ProviderSettings,
};
pub use orchestrator::FallbackOrchestrator;
