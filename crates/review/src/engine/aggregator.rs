//! Deterministic merge of per-adapter results into one report.
//!
//! Aggregation has no fallible paths: any combination of successes and
//! failures — including all-failed — yields a well-formed report. Inputs are
//! walked in sorted adapter order and the final sort uses a total key, so
//! re-aggregating the same results is bit-identical.

use crate::adapters::ml::ML_REVIEW_ID;
use crate::core::{AdapterResult, Finding, Report, ReportStatus, ReviewConfig};
use std::collections::BTreeMap;
use tracing::debug;

pub struct Aggregator {
    config: ReviewConfig,
}

impl Aggregator {
    pub fn new(config: ReviewConfig) -> Self {
        Self { config }
    }

    pub fn aggregate(
        &self,
        job_id: &str,
        results: &BTreeMap<String, AdapterResult>,
    ) -> Report {
        let mut findings: Vec<Finding> = Vec::new();
        let mut failures = BTreeMap::new();
        let mut successes = 0usize;

        for (adapter_id, result) in results {
            findings.extend_from_slice(result.findings());
            match result.error() {
                None => successes += 1,
                Some(error) => {
                    failures.insert(adapter_id.clone(), error.reason().to_string());
                }
            }
        }

        let before = findings.len();
        if self.config.deduplication_enabled {
            findings = self.deduplicate(findings);
        }
        debug!(
            job_id,
            before,
            after = findings.len(),
            "aggregated findings"
        );

        sort_findings(&mut findings);

        let status = if results.is_empty() || successes == 0 {
            ReportStatus::Failed
        } else if failures.is_empty() {
            ReportStatus::Complete
        } else {
            ReportStatus::Partial
        };

        Report::new(job_id.to_string(), status, findings, failures)
    }

    /// Two findings are duplicates when they sit on the same normalized line
    /// (within the configured tolerance) and one normalized message contains
    /// the other. The survivor is the higher severity; on equal severity the
    /// static source beats the ML source, since static tools are more
    /// precise about identical claims.
    fn deduplicate(&self, findings: Vec<Finding>) -> Vec<Finding> {
        let mut kept: Vec<Finding> = Vec::with_capacity(findings.len());

        for candidate in findings {
            let mut merged = false;
            for existing in kept.iter_mut() {
                if self.is_duplicate(existing, &candidate) {
                    if prefer_candidate(existing, &candidate) {
                        *existing = candidate.clone();
                    }
                    merged = true;
                    break;
                }
            }
            if !merged {
                kept.push(candidate);
            }
        }

        kept
    }

    fn is_duplicate(&self, a: &Finding, b: &Finding) -> bool {
        if a.line().abs_diff(b.line()) > self.config.dedup_line_tolerance {
            return false;
        }

        let msg_a = a.normalized_message();
        let msg_b = b.normalized_message();
        msg_a.contains(&msg_b) || msg_b.contains(&msg_a)
    }
}

fn prefer_candidate(existing: &Finding, candidate: &Finding) -> bool {
    if candidate.severity != existing.severity {
        return candidate.severity > existing.severity;
    }
    // Severity tie: take the candidate only when it is the static claim and
    // the kept one came from the model.
    existing.source == ML_REVIEW_ID && candidate.source != ML_REVIEW_ID
}

/// Severity descending, then line ascending (missing locations normalize to
/// 0), then category name, then message and source as stable final keys.
fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.line().cmp(&b.line()))
            .then_with(|| a.category.cmp(&b.category))
            .then_with(|| a.message.cmp(&b.message))
            .then_with(|| a.source.cmp(&b.source))
    });
}
