use crate::adapters::{run_tool, write_snippet};
use crate::core::{
    AdapterError, AnalysisJob, Analyzer, Category, Finding, Language, Location, Severity,
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Runs bandit, the Python security scanner. Every bandit hit is a security
/// finding; only the severity varies.
pub struct BanditAdapter;

pub const BANDIT_ID: &str = "bandit";

#[derive(Debug, Deserialize)]
struct BanditReport {
    #[serde(default)]
    results: Vec<BanditIssue>,
}

#[derive(Debug, Deserialize)]
struct BanditIssue {
    issue_severity: String,
    issue_text: String,
    line_number: u32,
    #[serde(default)]
    test_id: Option<String>,
}

fn map_severity(raw: &str) -> Severity {
    match raw.to_uppercase().as_str() {
        "HIGH" => Severity::High,
        "MEDIUM" => Severity::Medium,
        "LOW" => Severity::Low,
        _ => Severity::Medium,
    }
}

fn parse_output(stdout: &str) -> Result<Vec<Finding>, AdapterError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let report: BanditReport = serde_json::from_str(trimmed)
        .map_err(|e| AdapterError::MalformedOutput(format!("bandit JSON parse failed: {}", e)))?;

    let findings = report
        .results
        .into_iter()
        .filter(|issue| !issue.issue_text.trim().is_empty())
        .map(|issue| {
            let severity = map_severity(&issue.issue_severity);
            let mut finding = Finding::new(BANDIT_ID, Category::Security, severity, issue.issue_text)
                .with_location(Location::new(issue.line_number));
            if let Some(test_id) = issue.test_id {
                finding = finding.with_rule_id(test_id);
            }
            finding
        })
        .collect();

    Ok(findings)
}

#[async_trait]
impl Analyzer for BanditAdapter {
    fn id(&self) -> &'static str {
        BANDIT_ID
    }

    fn name(&self) -> &'static str {
        "Bandit"
    }

    fn description(&self) -> &'static str {
        "Python security issue scanner"
    }

    fn supports(&self, language: Language) -> bool {
        language == Language::Python
    }

    async fn analyze(&self, job: &AnalysisJob) -> Result<Vec<Finding>, AdapterError> {
        let file = write_snippet(&job.snippet, job.language)?;
        let path = file.path().to_string_lossy().to_string();

        let output = run_tool("bandit", &["-f", "json", path.as_str()]).await?;

        // Exit 1 means issues were found; the report is still on stdout.
        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AdapterError::Crash(format!(
                "bandit produced no report ({}): {}",
                output.status,
                stderr.trim()
            )));
        }

        let findings = parse_output(&stdout)?;
        debug!(count = findings.len(), "bandit findings");
        Ok(findings)
    }
}
