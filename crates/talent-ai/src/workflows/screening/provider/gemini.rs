use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use super::{request_error, ProviderClient, ProviderError};
use crate::config::GeminiConfig;

/// Secondary generative provider speaking the Gemini-compatible
/// generateContent API, with an ordered list of model variants.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    models: Vec<String>,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ProviderError::Unavailable(format!("http client build failed: {err}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            models: config.models.clone(),
        })
    }
}

#[async_trait]
impl ProviderClient for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn models(&self) -> &[String] {
        &self.models
    }

    async fn classify(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Unavailable("GEMINI_API_KEY not configured".to_string()))?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, model
        );
        let body = json!({
            "contents": [
                { "role": "user", "parts": [ { "text": prompt } ] }
            ],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "object",
                    "properties": {
                        "result": { "type": "string" },
                        "reason": { "type": "string" },
                        "confidence": { "type": "number" },
                        "jobFitScore": { "type": "number" }
                    },
                    "required": ["result", "reason", "confidence", "jobFitScore"]
                },
                "temperature": 0.2
            }
        });

        tracing::debug!(%model, "dispatching screening prompt to fallback provider");

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
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

        extract_candidate_text(&payload)
            .ok_or_else(|| ProviderError::Transient("response contained no candidate text".to_string()))
    }
}

fn classify_failure(status: StatusCode, detail: &str) -> ProviderError {
    let lowered = detail.to_ascii_lowercase();
    if status == StatusCode::NOT_FOUND
        || lowered.contains("not found")
        || lowered.contains("not supported")
    {
        return ProviderError::NotSupported(format!("{status}: {detail}"));
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::Unavailable(format!("{status}: {detail}"))
        }
        _ => ProviderError::Transient(format!("{status}: {detail}")),
    }
}

fn extract_candidate_text(payload: &Value) -> Option<String> {
    let parts = payload
        .get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let mut collected = String::new();
    for part in parts {
        if let Some(text) = part.get("text").and_then(Value::as_str) {
            collected.push_str(text);
        }
    }

    if collected.trim().is_empty() {
        None
    } else {
        Some(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_candidate_parts() {
        let payload = json!({
            "candidates": [
                {
                    "content": {
                        "parts": [
                            { "text": "{\"result\": \"Strong Fit\"" },
                            { "text": ", \"reason\": \"strong overlap\"}" }
                        ]
                    }
                }
            ]
        });
        let text = extract_candidate_text(&payload).expect("candidate text present");
        assert!(text.starts_with("{\"result\""));
        assert!(text.ends_with('}'));
    }

    #[test]
    fn missing_candidates_is_none() {
        assert!(extract_candidate_text(&json!({})).is_none());
    }

    #[test]
    fn deprecated_model_message_is_not_supported() {
        let err = classify_failure(
            StatusCode::BAD_REQUEST,
            "models/gemini-0.9-flash is not found for API version v1beta",
        );
        assert!(matches!(err, ProviderError::NotSupported(_)));
    }

    #[test]
    fn missing_key_rejection_is_unavailable() {
        let err = classify_failure(StatusCode::FORBIDDEN, "API key invalid");
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }
}
