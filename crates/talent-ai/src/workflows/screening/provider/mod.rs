//! Uniform interface to a single generative-text backend.
//!
//! Each client performs exactly one network call per attempt; retry and
//! fallback ordering belong to the cascade.

mod gemini;
mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

use async_trait::async_trait;

/// Failure signals a single provider attempt can produce.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Auth or configuration missing; the provider cannot serve any request.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    /// The requested model variant rejected the request (unknown model,
    /// capability mismatch). The next variant of the same provider may work.
    #[error("model not supported: {0}")]
    NotSupported(String),
    /// Rate limit, quota, timeout, or a malformed/empty response body.
    #[error("transient provider failure: {0}")]
    Transient(String),
}

/// Capability contract for one generative-text backend.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Short provider identity used in logs and outcomes.
    fn name(&self) -> &'static str;

    /// Preference-ordered model variants to try for this provider.
    fn models(&self) -> &[String];

    /// Run one classification attempt against a single model variant.
    async fn classify(&self, model: &str, prompt: &str) -> Result<String, ProviderError>;
}

pub(crate) fn request_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Transient(format!("request timed out: {err}"))
    } else {
        ProviderError::Transient(format!("request failed: {err}"))
    }
}
