use crate::inference::{InferenceError, InferenceProvider, InferenceRequest, InferenceResponse};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Canned inference backend for tests: responses keyed on prompt substrings,
/// with optional artificial latency and a failing mode.
pub struct MockInferenceProvider {
    responses: Vec<(String, String)>,
    default_response: String,
    call_count: AtomicUsize,
    delay: Duration,
    should_fail: bool,
}

impl Default for MockInferenceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockInferenceProvider {
    pub fn new() -> Self {
        Self {
            responses: Vec::new(),
            default_response: "The code looks reasonable overall.".to_string(),
            call_count: AtomicUsize::new(0),
            delay: Duration::from_millis(5),
            should_fail: false,
        }
    }

    pub fn failing() -> Self {
        let mut provider = Self::new();
        provider.should_fail = true;
        provider
    }

    pub fn with_response(mut self, prompt_pattern: &str, response: &str) -> Self {
        self.responses
            .push((prompt_pattern.to_string(), response.to_string()));
        self
    }

    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = response.to_string();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceProvider for MockInferenceProvider {
    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if self.should_fail {
            return Err(InferenceError::Api(
                "mock provider configured to fail".to_string(),
            ));
        }

        tokio::time::sleep(self.delay).await;

        let text = self
            .responses
            .iter()
            .find(|(pattern, _)| request.prompt.contains(pattern.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.default_response.clone());

        Ok(InferenceResponse {
            text,
            model: "mock-model".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
