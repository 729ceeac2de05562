use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use super::{request_error, ProviderClient, ProviderError};
use crate::config::OpenAiConfig;

/// Primary generative provider speaking the OpenAI-compatible responses API.
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    models: Vec<String>,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ProviderError::Unavailable(format!("http client build failed: {err}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            models: vec![config.model.clone()],
        })
    }
}

#[async_trait]
impl ProviderClient for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn models(&self) -> &[String] {
        &self.models
    }

    async fn classify(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Unavailable("OPENAI_API_KEY not configured".to_string()))?;

        let url = format!("{}/v1/responses", self.base_url);
        let body = json!({
            "model": model,
            "reasoning": { "effort": "high" },
            "input": [
                { "role": "user", "content": prompt }
            ],
        });

        tracing::debug!(%model, "dispatching screening prompt to primary provider");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &detail));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| ProviderError::Transient(format!("unreadable response body: {err}")))?;

        extract_output_text(&payload)
            .ok_or_else(|| ProviderError::Transient("response contained no output text".to_string()))
    }
}

fn classify_failure(status: StatusCode, detail: &str) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::Unavailable(format!("{status}: {detail}"))
        }
        StatusCode::NOT_FOUND => ProviderError::NotSupported(format!("{status}: {detail}")),
        StatusCode::BAD_REQUEST if detail.contains("model") => {
            ProviderError::NotSupported(format!("{status}: {detail}"))
        }
        _ => ProviderError::Transient(format!("{status}: {detail}")),
    }
}

/// The responses API nests text output; accept either the flattened
/// `output_text` convenience field or the structured `output` array.
fn extract_output_text(payload: &Value) -> Option<String> {
    if let Some(text) = payload.get("output_text").and_then(Value::as_str) {
        if !text.trim().is_empty() {
            return Some(text.to_string());
        }
    }

    let mut collected = String::new();
    for item in payload.get("output")?.as_array()? {
        let Some(parts) = item.get("content").and_then(Value::as_array) else {
            continue;
        };
        for part in parts {
            if part.get("type").and_then(Value::as_str) == Some("output_text") {
                if let Some(text) = part.get("text").and_then(Value::as_str) {
                    collected.push_str(text);
                }
            }
        }
    }

    if collected.trim().is_empty() {
        None
    } else {
        Some(collected)
    }
}
