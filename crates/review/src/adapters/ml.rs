//! ML-backed review adapter.
//!
//! Sends the snippet to a hosted text-generation model with a structured
//! review prompt, then parses the generated free text back into findings
//! with a best-effort heuristic: bullet extraction, `line N` sniffing, and
//! keyword classification. Model output is never silently dropped — when no
//! bullets parse out of a non-empty response, the raw text survives as one
//! low-severity refactor finding.

use crate::core::{
    AdapterError, AnalysisJob, Analyzer, Category, Finding, Language, Location, Severity,
};
use crate::inference::{InferenceError, InferenceProvider, InferenceRequest};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

pub struct MlReviewAdapter {
    provider: Arc<dyn InferenceProvider>,
}

pub const ML_REVIEW_ID: &str = "ml-review";

impl MlReviewAdapter {
    pub fn new(provider: Arc<dyn InferenceProvider>) -> Self {
        Self { provider }
    }

    fn build_prompt(snippet: &str, language: Language) -> String {
        format!(
            "Review this {} code and provide:\n\
             1. Brief summary of what the code does\n\
             2. Readability suggestions\n\
             3. Potential bugs\n\
             4. Security concerns\n\
             5. Refactoring suggestions\n\n\
             Code:\n{}\n\nREVIEW:",
            language, snippet
        )
    }
}

/// Pulls a line number out of text like "line 12" or "Line 3:".
fn sniff_line_number(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    let idx = lower.find("line ")?;
    let rest = &lower[idx + "line ".len()..];
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok().filter(|&n| n > 0)
}

fn classify(text: &str) -> (Category, Severity) {
    let lower = text.to_lowercase();

    let category = if ["security", "injection", "vulnerab", "unsafe", "secret", "password"]
        .iter()
        .any(|kw| lower.contains(kw))
    {
        Category::Security
    } else if ["bug", "crash", "exception", "undefined", "incorrect", "error"]
        .iter()
        .any(|kw| lower.contains(kw))
    {
        Category::Bug
    } else if ["performance", "slow", "inefficien", "n+1", "allocat"]
        .iter()
        .any(|kw| lower.contains(kw))
    {
        Category::Performance
    } else if ["readab", "naming", "docstring", "comment", "style", "unused"]
        .iter()
        .any(|kw| lower.contains(kw))
    {
        Category::Quality
    } else {
        Category::Refactor
    };

    let severity = if ["critical", "severe", "dangerous", "exploit"]
        .iter()
        .any(|kw| lower.contains(kw))
    {
        Severity::High
    } else if ["minor", "nit", "consider", "might", "could"]
        .iter()
        .any(|kw| lower.contains(kw))
    {
        Severity::Low
    } else {
        match category {
            Category::Security | Category::Bug => Severity::Medium,
            _ => Severity::Low,
        }
    };

    (category, severity)
}

/// True for list items the model tends to produce: "- foo", "* foo",
/// "3. foo", "2) foo".
fn strip_bullet(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();

    for prefix in ["- ", "* ", "• "] {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            return Some(rest.trim());
        }
    }

    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return Some(rest.trim());
        }
    }

    None
}

fn parse_review_text(text: &str) -> Vec<Finding> {
    let mut findings = Vec::new();

    for line in text.lines() {
        let Some(item) = strip_bullet(line) else {
            continue;
        };
        if item.len() < 8 {
            // Too short to be an actionable suggestion ("4.", "- ok").
            continue;
        }

        let (category, severity) = classify(item);
        let mut finding = Finding::new(ML_REVIEW_ID, category, severity, item);
        if let Some(line_number) = sniff_line_number(item) {
            finding = finding.with_location(Location::new(line_number));
        }
        findings.push(finding);
    }

    findings
}

#[async_trait]
impl Analyzer for MlReviewAdapter {
    fn id(&self) -> &'static str {
        ML_REVIEW_ID
    }

    fn name(&self) -> &'static str {
        "ML review"
    }

    fn description(&self) -> &'static str {
        "Model-generated review parsed into findings"
    }

    fn supports(&self, _language: Language) -> bool {
        true
    }

    async fn analyze(&self, job: &AnalysisJob) -> Result<Vec<Finding>, AdapterError> {
        let request = InferenceRequest {
            prompt: Self::build_prompt(&job.snippet, job.language),
            ..Default::default()
        };

        let response = self.provider.generate(request).await.map_err(|e| match e {
            InferenceError::Timeout(secs) => {
                AdapterError::Timeout(std::time::Duration::from_secs(secs))
            }
            InferenceError::Network(msg) => AdapterError::Unavailable(msg),
            InferenceError::InvalidResponse(msg) => AdapterError::MalformedOutput(msg),
            InferenceError::Api(msg) => AdapterError::Crash(msg),
        })?;

        debug!(model = %response.model, chars = response.text.len(), "model response received");

        let text = response.text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let findings = parse_review_text(text);
        if findings.is_empty() {
            // Nothing structured came out, but the model did say something.
            info!("model output had no parseable bullets, keeping raw text");
            return Ok(vec![Finding::new(
                ML_REVIEW_ID,
                Category::Refactor,
                Severity::Low,
                text,
            )]);
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::MockInferenceProvider;
    use std::time::Duration;

    #[test]
    fn test_parse_bullets_with_line_numbers() {
        let text = "Here is my review:\n\
                    - line 3: unused import detected, remove it\n\
                    * Possible SQL injection on line 12, critical issue\n\
                    2. Consider extracting the loop body into a helper\n";
        let findings = parse_review_text(text);
        assert_eq!(findings.len(), 3);

        assert_eq!(findings[0].category, Category::Quality);
        assert_eq!(findings[0].line(), 3);

        assert_eq!(findings[1].category, Category::Security);
        assert_eq!(findings[1].severity, Severity::High);
        assert_eq!(findings[1].line(), 12);

        assert_eq!(findings[2].category, Category::Refactor);
        assert_eq!(findings[2].severity, Severity::Low);
        assert_eq!(findings[2].line(), 0);
    }

    #[test]
    fn test_prose_without_bullets_parses_to_nothing() {
        let text = "The code defines a small utility function and looks fine.";
        assert!(parse_review_text(text).is_empty());
    }

    #[test]
    fn test_sniff_line_number() {
        assert_eq!(sniff_line_number("problem on line 42 here"), Some(42));
        assert_eq!(sniff_line_number("Line 7: thing"), Some(7));
        assert_eq!(sniff_line_number("no location given"), None);
        assert_eq!(sniff_line_number("line zero"), None);
    }

    #[tokio::test]
    async fn test_unparseable_output_becomes_verbatim_finding() {
        let provider = MockInferenceProvider::new()
            .with_default_response("This function would benefit from clearer naming overall.");
        let adapter = MlReviewAdapter::new(Arc::new(provider));

        let job = AnalysisJob::new("def f(): pass", Language::Python);
        let findings = adapter.analyze(&job).await.unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, Category::Refactor);
        assert_eq!(findings[0].severity, Severity::Low);
        assert!(findings[0].message.contains("clearer naming"));
    }

    #[tokio::test]
    async fn test_provider_failure_maps_to_adapter_error() {
        let adapter = MlReviewAdapter::new(Arc::new(MockInferenceProvider::failing()));
        let job = AnalysisJob::new("def f(): pass", Language::Python);

        let result = adapter.run(&job, Duration::from_secs(5)).await;
        assert!(!result.is_success());
        assert_eq!(result.error().unwrap().reason(), "crash");
    }

    #[tokio::test]
    async fn test_supports_both_languages() {
        let adapter = MlReviewAdapter::new(Arc::new(MockInferenceProvider::new()));
        assert!(adapter.supports(Language::Python));
        assert!(adapter.supports(Language::Javascript));
    }
}
