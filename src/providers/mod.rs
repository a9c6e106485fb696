//! Provider implementations and the registry that orders them.
//!
//! Each remote AI service is wrapped behind [`CodeAnalysisProvider`]. The
//! [`ProviderRegistry`] keeps them in priority order and wraps each one in
//! [`RetryingProvider`] when a [`RetryConfig`] is set.

pub mod anthropic;
pub mod gemini;
mod http;
pub mod openai;
pub mod prompts;
pub mod registry;
pub mod retry;
pub(crate) mod routing;
pub mod traits;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use http::DEFAULT_TIMEOUT;
pub use openai::OpenAiClient;
pub use registry::{ProviderDescriptor, ProviderRegistry, ProviderStatus};
pub use retry::{RetryConfig, RetryingProvider};
pub use traits::CodeAnalysisProvider;
