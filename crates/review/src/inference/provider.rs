use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("API error: {0}")]
    Api(String),

    #[error("invalid response payload: {0}")]
    InvalidResponse(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("inference request timed out after {0} seconds")]
    Timeout(u64),
}

#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub prompt: String,
    pub max_new_tokens: u32,
    pub temperature: f32,
}

impl Default for InferenceRequest {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            max_new_tokens: 512,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InferenceResponse {
    pub text: String,
    pub model: String,
}

/// Remote text-generation backend. The ML adapter only depends on this
/// trait, so tests swap in the mock and the CLI wires the HTTP client.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError>;

    fn model_name(&self) -> &str;

    /// Prompts are truncated to this before sending.
    fn max_input_chars(&self) -> usize {
        4000
    }
}

/// Hosted text-generation call in the Hugging Face inference style: POST the
/// prompt, get generated text back. Works against any endpoint speaking
/// `{"inputs": ..., "parameters": {...}}` → `[{"generated_text": ...}]`.
pub struct HttpInferenceProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_token: Option<String>,
    max_retries: u32,
    timeout_seconds: u64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeneratedPayload {
    Many(Vec<GeneratedText>),
    One(GeneratedText),
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

impl HttpInferenceProvider {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        let api_token = std::env::var("TENSAKU_API_TOKEN")
            .or_else(|_| std::env::var("HF_API_TOKEN"))
            .ok();

        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_token,
            max_retries: 3,
            timeout_seconds: 25,
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Caps the prompt at `max_chars`. The prompt ends with the `REVIEW:`
    /// marker that `extract_text` keys on, so a cut restores it.
    fn truncate_prompt(prompt: &str, max_chars: usize) -> String {
        if prompt.chars().count() <= max_chars {
            return prompt.to_string();
        }
        let mut truncated: String = prompt.chars().take(max_chars).collect();
        truncated.push_str("\nREVIEW:");
        truncated
    }

    fn extract_text(body: &str) -> Result<String, InferenceError> {
        let payload: GeneratedPayload = serde_json::from_str(body)
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        let text = match payload {
            GeneratedPayload::Many(mut items) => {
                if items.is_empty() {
                    return Err(InferenceError::InvalidResponse(
                        "empty generation array".to_string(),
                    ));
                }
                items.remove(0).generated_text
            }
            GeneratedPayload::One(item) => item.generated_text,
        };

        // Generation models echo the prompt; keep only what follows the
        // REVIEW: marker when present.
        let text = match text.rfind("REVIEW:") {
            Some(idx) => text[idx + "REVIEW:".len()..].trim().to_string(),
            None => text.trim().to_string(),
        };

        Ok(text)
    }
}

#[async_trait]
impl InferenceProvider for HttpInferenceProvider {
    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError> {
        let prompt = Self::truncate_prompt(&request.prompt, self.max_input_chars());

        let body = serde_json::json!({
            "inputs": prompt,
            "parameters": {
                "max_new_tokens": request.max_new_tokens,
                "temperature": request.temperature,
                "return_full_text": false,
            }
        });

        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!(model = %self.model, attempt, "sending inference request");

            let mut builder = self
                .client
                .post(&self.endpoint)
                .timeout(Duration::from_secs(self.timeout_seconds))
                .json(&body);
            if let Some(ref token) = self.api_token {
                builder = builder.bearer_auth(token);
            }

            let outcome = builder.send().await;

            match outcome {
                Ok(response) => {
                    let status = response.status();
                    let text = response
                        .text()
                        .await
                        .map_err(|e| InferenceError::Network(e.to_string()))?;

                    if status.is_success() {
                        let generated = Self::extract_text(&text)?;
                        return Ok(InferenceResponse {
                            text: generated,
                            model: self.model.clone(),
                        });
                    }

                    // 429 and 503 are transient on hosted inference (rate
                    // limit, cold model); everything else fails outright.
                    if (status.as_u16() == 429 || status.as_u16() == 503)
                        && attempt < self.max_retries
                    {
                        warn!(%status, attempt, "transient inference error, retrying");
                        tokio::time::sleep(Duration::from_secs(2_u64.pow(attempt))).await;
                        continue;
                    }

                    return Err(InferenceError::Api(format!("{}: {}", status, text)));
                }
                Err(e) if e.is_timeout() => {
                    return Err(InferenceError::Timeout(self.timeout_seconds));
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        warn!(error = %e, attempt, "network error, retrying");
                        tokio::time::sleep(Duration::from_millis(200 * attempt as u64)).await;
                        continue;
                    }
                    return Err(InferenceError::Network(e.to_string()));
                }
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
