use crate::core::{Finding, Severity};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Complete,
    Partial,
    Failed,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::Partial => write!(f, "partial"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Final output of one analysis job: deduplicated findings in severity order
/// plus the failure set. Built once by the aggregator and immutable after;
/// the presentation layer only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    job_id: String,
    status: ReportStatus,
    findings: Vec<Finding>,
    failures: BTreeMap<String, String>,
    generated_at: DateTime<Utc>,
}

/// Semantic equality: two reports for the same job with the same findings
/// and failure set are equal regardless of when they were generated.
impl PartialEq for Report {
    fn eq(&self, other: &Self) -> bool {
        self.job_id == other.job_id
            && self.status == other.status
            && self.findings == other.findings
            && self.failures == other.failures
    }
}

impl Report {
    pub(crate) fn new(
        job_id: String,
        status: ReportStatus,
        findings: Vec<Finding>,
        failures: BTreeMap<String, String>,
    ) -> Self {
        Self {
            job_id,
            status,
            findings,
            failures,
            generated_at: Utc::now(),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn status(&self) -> ReportStatus {
        self.status
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Adapter id → failure reason, for every adapter that did not succeed.
    pub fn failures(&self) -> &BTreeMap<String, String> {
        &self.failures
    }

    pub fn count_by_severity(&self) -> SeverityCount {
        let mut count = SeverityCount::default();
        for finding in &self.findings {
            match finding.severity {
                Severity::High => count.high += 1,
                Severity::Medium => count.medium += 1,
                Severity::Low => count.low += 1,
            }
        }
        count
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_markdown(&self) -> String {
        let mut md = format!("# Review Report — {}\n\n", self.job_id);
        md.push_str(&format!("**Status:** {}\n\n", self.status));

        let count = self.count_by_severity();
        md.push_str("## Summary\n\n");
        md.push_str(&format!("- High: {}\n", count.high));
        md.push_str(&format!("- Medium: {}\n", count.medium));
        md.push_str(&format!("- Low: {}\n\n", count.low));

        if !self.failures.is_empty() {
            md.push_str("## Failed analyzers\n\n");
            for (adapter, reason) in &self.failures {
                md.push_str(&format!("- `{}`: {}\n", adapter, reason));
            }
            md.push('\n');
        }

        if !self.findings.is_empty() {
            md.push_str("## Findings\n\n");
            for finding in &self.findings {
                let line = match finding.location {
                    Some(loc) => format!("line {}", loc.line),
                    None => "no location".to_string(),
                };
                md.push_str(&format!(
                    "### [{}] {} ({}, {})\n\n",
                    finding.severity, finding.message, finding.category, line
                ));
                md.push_str(&format!("**Analyzer:** {}\n", finding.source));
                if let Some(ref rule) = finding.rule_id {
                    md.push_str(&format!("**Rule:** {}\n", rule));
                }
                md.push('\n');
            }
        }

        md
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeverityCount {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Category;

    fn sample_report() -> Report {
        let findings = vec![
            Finding::new("pylint", Category::Bug, Severity::High, "undefined variable")
                .with_line(3),
            Finding::new("bandit", Category::Security, Severity::Medium, "weak hash").with_line(8),
            Finding::new("ml-review", Category::Refactor, Severity::Low, "extract a helper"),
        ];
        let mut failures = BTreeMap::new();
        failures.insert("eslint".to_string(), "unavailable".to_string());
        Report::new("job-1-0".to_string(), ReportStatus::Partial, findings, failures)
    }

    #[test]
    fn test_count_by_severity() {
        let count = sample_report().count_by_severity();
        assert_eq!(count.high, 1);
        assert_eq!(count.medium, 1);
        assert_eq!(count.low, 1);
    }

    #[test]
    fn test_markdown_lists_failures_and_findings() {
        let md = sample_report().to_markdown();
        assert!(md.contains("**Status:** partial"));
        assert!(md.contains("`eslint`: unavailable"));
        assert!(md.contains("undefined variable"));
        assert!(md.contains("no location"));
    }

    #[test]
    fn test_json_round_trips() {
        let report = sample_report();
        let json = report.to_json().unwrap();
        let back: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
