use super::normalizer::{normalize_verdict, MalformedResponse};
use super::provider::{GeminiClient, OpenAiClient, ProviderClient, ProviderError};
use crate::config::ProvidersConfig;

use super::domain::ScreeningVerdict;

/// Successful classification, tagged with the provider and model that served it.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub verdict: ScreeningVerdict,
    pub provider: &'static str,
    pub model: String,
}

/// Failure of a single (provider, model) attempt.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Malformed(#[from] MalformedResponse),
}

#[derive(Debug, thiserror::Error)]
pub enum CascadeError {
    /// Every provider/variant combination failed; carries the last error.
    #[error("all screening providers failed: {last}")]
    Exhausted {
        #[source]
        last: AttemptError,
    },
    #[error("no screening providers are configured")]
    Empty,
}

/// Ordered fallback over generative-text providers, each carrying an ordered
/// list of model variants.
///
/// Iteration rules: `NotSupported` moves to the next variant of the same
/// provider; any other failure (including a well-formed HTTP response whose
/// payload fails normalization) abandons that provider's remaining variants
/// and falls through to the next provider; the first success returns
/// immediately. Failing providers are retried on every request; there is no
/// cooldown between requests.
pub struct ProviderCascade {
    providers: Vec<Box<dyn ProviderClient>>,
}

impl ProviderCascade {
    pub fn new(providers: Vec<Box<dyn ProviderClient>>) -> Self {
        Self { providers }
    }

    /// Build the production ordering: primary generative provider first,
    /// secondary provider as the whole-provider fallback.
    pub fn from_config(config: &ProvidersConfig) -> Result<Self, ProviderError> {
        let openai = OpenAiClient::new(&config.openai, config.request_timeout)?;
        let gemini = GeminiClient::new(&config.gemini, config.request_timeout)?;
        Ok(Self::new(vec![Box::new(openai), Box::new(gemini)]))
    }

    pub async fn classify(&self, prompt: &str) -> Result<Classification, CascadeError> {
        let mut last_error: Option<AttemptError> = None;

        for provider in &self.providers {
            'variants: for model in provider.models() {
                match provider.classify(model, prompt).await {
                    Ok(raw) => match normalize_verdict(&raw) {
                        Ok(verdict) => {
                            tracing::info!(
                                provider = provider.name(),
                                %model,
                                result = verdict.result.label(),
                                "screening classification succeeded"
                            );
                            return Ok(Classification {
                                verdict,
                                provider: provider.name(),
                                model: model.clone(),
                            });
                        }
                        Err(err) => {
                            tracing::warn!(
                                provider = provider.name(),
                                %model,
                                error = %err,
                                "provider returned malformed verdict; advancing to next provider"
                            );
                            last_error = Some(err.into());
                            break 'variants;
                        }
                    },
                    Err(err @ ProviderError::NotSupported(_)) => {
                        tracing::debug!(
                            provider = provider.name(),
                            %model,
                            error = %err,
                            "model variant rejected; trying next variant"
                        );
                        last_error = Some(err.into());
                    }
                    Err(err) => {
                        tracing::warn!(
                            provider = provider.name(),
                            %model,
                            error = %err,
                            "provider attempt failed; advancing to next provider"
                        );
                        last_error = Some(err.into());
                        break 'variants;
                    }
                }
            }
        }

        match last_error {
            Some(last) => Err(CascadeError::Exhausted { last }),
            None => Err(CascadeError::Empty),
        }
    }
}
