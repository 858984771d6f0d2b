use crate::adapters::{run_tool, write_snippet};
use crate::core::{
    AdapterError, AnalysisJob, Analyzer, Category, Finding, Language, Location, Severity,
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Runs pylint over the snippet and maps its message classes onto the common
/// finding shape.
pub struct PylintAdapter;

pub const PYLINT_ID: &str = "pylint";

#[derive(Debug, Deserialize)]
struct PylintMessage {
    #[serde(rename = "message-id")]
    message_id: String,
    line: u32,
    #[serde(default)]
    column: Option<u32>,
    message: String,
    #[serde(default)]
    symbol: Option<String>,
}

/// Severity/category table keyed on pylint's message-id prefix. Errors and
/// fatals are treated as real bugs; convention and refactor classes carry
/// lower weight. Anything unrecognized lands on the documented default.
fn map_message_id(message_id: &str) -> (Category, Severity) {
    match message_id.chars().next() {
        Some('E') | Some('F') => (Category::Bug, Severity::High),
        Some('W') => (Category::Quality, Severity::Medium),
        Some('C') => (Category::Quality, Severity::Low),
        Some('R') => (Category::Refactor, Severity::Low),
        _ => (Category::Quality, Severity::Medium),
    }
}

fn parse_output(stdout: &str) -> Result<Vec<Finding>, AdapterError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    // Modern pylint emits one JSON array; older versions could be coaxed
    // into line-delimited objects. Accept both.
    let messages: Vec<PylintMessage> = match serde_json::from_str(trimmed) {
        Ok(messages) => messages,
        Err(array_err) => {
            let mut messages = Vec::new();
            for line in trimmed.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<PylintMessage>(line) {
                    Ok(message) => messages.push(message),
                    Err(_) => {
                        return Err(AdapterError::MalformedOutput(format!(
                            "pylint output is neither a JSON array nor JSON lines: {}",
                            array_err
                        )))
                    }
                }
            }
            messages
        }
    };

    let findings = messages
        .into_iter()
        .filter(|m| !m.message.trim().is_empty())
        .map(|m| {
            let (category, severity) = map_message_id(&m.message_id);
            let mut location = Location::new(m.line);
            if let Some(column) = m.column {
                location = location.with_column(column);
            }
            let rule = m.symbol.unwrap_or_else(|| m.message_id.clone());
            Finding::new(PYLINT_ID, category, severity, m.message)
                .with_location(location)
                .with_rule_id(rule)
        })
        .collect();

    Ok(findings)
}

#[async_trait]
impl Analyzer for PylintAdapter {
    fn id(&self) -> &'static str {
        PYLINT_ID
    }

    fn name(&self) -> &'static str {
        "Pylint"
    }

    fn description(&self) -> &'static str {
        "Python linting: code quality, errors, and conventions"
    }

    fn supports(&self, language: Language) -> bool {
        language == Language::Python
    }

    async fn analyze(&self, job: &AnalysisJob) -> Result<Vec<Finding>, AdapterError> {
        let file = write_snippet(&job.snippet, job.language)?;
        let path = file.path().to_string_lossy().to_string();

        let output = run_tool(
            "pylint",
            &[path.as_str(), "--output-format=json", "--score=n"],
        )
        .await?;

        // Pylint's exit status is a bitmask of message classes, so non-zero
        // just means it found something. A genuine crash leaves stdout empty.
        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() && !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AdapterError::Crash(format!(
                "pylint exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let findings = parse_output(&stdout)?;
        debug!(count = findings.len(), "pylint findings");
        Ok(findings)
    }
}
