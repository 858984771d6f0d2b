//! End-to-end scenarios through the coordinator and aggregator with stub
//! adapters standing in for the external tools.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tensaku_review::{
    AdapterError, AdapterRegistry, AnalysisJob, Analyzer, Aggregator, Category,
    ExecutionCoordinator, Finding, Language, ReportStatus, ReviewConfig, Severity,
};

enum StubBehavior {
    Findings(Vec<Finding>),
    Fail(AdapterError),
    Sleep(Duration),
}

struct StubAdapter {
    id: &'static str,
    language: Option<Language>,
    behavior: StubBehavior,
}

impl StubAdapter {
    fn with_findings(id: &'static str, language: Language, findings: Vec<Finding>) -> Self {
        Self {
            id,
            language: Some(language),
            behavior: StubBehavior::Findings(findings),
        }
    }

    fn failing(id: &'static str, language: Language, error: AdapterError) -> Self {
        Self {
            id,
            language: Some(language),
            behavior: StubBehavior::Fail(error),
        }
    }

    fn sleeping(id: &'static str, delay: Duration) -> Self {
        Self {
            id,
            language: None,
            behavior: StubBehavior::Sleep(delay),
        }
    }
}

#[async_trait]
impl Analyzer for StubAdapter {
    fn id(&self) -> &'static str {
        self.id
    }

    fn name(&self) -> &'static str {
        self.id
    }

    fn supports(&self, language: Language) -> bool {
        self.language.map(|l| l == language).unwrap_or(true)
    }

    async fn analyze(&self, _job: &AnalysisJob) -> Result<Vec<Finding>, AdapterError> {
        match &self.behavior {
            StubBehavior::Findings(findings) => Ok(findings.clone()),
            StubBehavior::Fail(error) => Err(error.clone()),
            StubBehavior::Sleep(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(vec![Finding::new(
                    self.id,
                    Category::Quality,
                    Severity::High,
                    "finding from after the deadline",
                )])
            }
        }
    }
}

fn engine_parts(
    adapters: Vec<StubAdapter>,
    config: ReviewConfig,
) -> (ExecutionCoordinator, Aggregator) {
    let mut registry = AdapterRegistry::new();
    for adapter in adapters {
        registry.register(adapter);
    }
    (
        ExecutionCoordinator::new(Arc::new(registry), config.clone()),
        Aggregator::new(config),
    )
}

fn finding(source: &str, category: Category, severity: Severity, msg: &str, line: u32) -> Finding {
    Finding::new(source, category, severity, msg).with_line(line)
}

/// Scenario A: all adapters succeed with distinct findings — complete
/// report, sum of counts, severity-descending order.
#[tokio::test]
async fn scenario_all_success_complete_report() {
    let (coordinator, aggregator) = engine_parts(
        vec![
            StubAdapter::with_findings(
                "pylint",
                Language::Python,
                vec![
                    finding("pylint", Category::Quality, Severity::Medium, "unused import", 1),
                    finding("pylint", Category::Bug, Severity::High, "undefined variable", 7),
                ],
            ),
            StubAdapter::with_findings(
                "bandit",
                Language::Python,
                vec![finding("bandit", Category::Security, Severity::High, "weak md5 hash", 12)],
            ),
            StubAdapter::with_findings(
                "ml-review",
                Language::Python,
                vec![finding("ml-review", Category::Refactor, Severity::Low, "extract helper", 20)],
            ),
        ],
        ReviewConfig::default(),
    );

    let job = Arc::new(AnalysisJob::new("import os\n", Language::Python));
    let results = coordinator.analyze(Arc::clone(&job)).await;
    let report = aggregator.aggregate(&job.id, &results);

    assert_eq!(report.status(), ReportStatus::Complete);
    assert_eq!(report.findings().len(), 4);
    assert!(report.failures().is_empty());

    let severities: Vec<Severity> = report.findings().iter().map(|f| f.severity).collect();
    let mut expected = severities.clone();
    expected.sort_by(|a, b| b.cmp(a));
    assert_eq!(severities, expected);
}

/// Scenario B: a static HIGH and an ML LOW at the same line with near-equal
/// messages collapse into the static HIGH.
#[tokio::test]
async fn scenario_static_and_ml_duplicates_collapse() {
    let (coordinator, aggregator) = engine_parts(
        vec![
            StubAdapter::with_findings(
                "pylint",
                Language::Python,
                vec![finding("pylint", Category::Quality, Severity::High, "unused import", 10)],
            ),
            StubAdapter::with_findings(
                "ml-review",
                Language::Python,
                vec![finding(
                    "ml-review",
                    Category::Quality,
                    Severity::Low,
                    "Unused import detected",
                    10,
                )],
            ),
        ],
        ReviewConfig::default(),
    );

    let job = Arc::new(AnalysisJob::new("import os\n", Language::Python));
    let results = coordinator.analyze(Arc::clone(&job)).await;
    let report = aggregator.aggregate(&job.id, &results);

    assert_eq!(report.findings().len(), 1);
    let survivor = &report.findings()[0];
    assert_eq!(survivor.source, "pylint");
    assert_eq!(survivor.severity, Severity::High);
}

/// Scenario C: the ML adapter times out, the rest succeed — partial report
/// with the timeout recorded and the other findings intact.
#[tokio::test]
async fn scenario_ml_timeout_yields_partial_report() {
    let config = ReviewConfig {
        adapter_timeout: Duration::from_millis(50),
        global_timeout: Duration::from_secs(10),
        ..Default::default()
    };
    let (coordinator, aggregator) = engine_parts(
        vec![
            StubAdapter::with_findings(
                "pylint",
                Language::Python,
                vec![finding("pylint", Category::Quality, Severity::Medium, "unused import", 1)],
            ),
            StubAdapter::with_findings(
                "bandit",
                Language::Python,
                vec![finding("bandit", Category::Security, Severity::High, "weak hash", 3)],
            ),
            StubAdapter::sleeping("ml-review", Duration::from_secs(5)),
        ],
        config,
    );

    let job = Arc::new(AnalysisJob::new("import os\n", Language::Python));
    let results = coordinator.analyze(Arc::clone(&job)).await;
    let report = aggregator.aggregate(&job.id, &results);

    assert_eq!(report.status(), ReportStatus::Partial);
    assert_eq!(report.failures().get("ml-review").map(String::as_str), Some("timeout"));
    assert_eq!(report.findings().len(), 2);
    assert!(report.findings().iter().all(|f| f.source != "ml-review"));
}

/// Scenario D: every adapter fails — the caller still gets a report, with
/// status failed, no findings, and every reason listed.
#[tokio::test]
async fn scenario_all_failed_still_produces_report() {
    let (coordinator, aggregator) = engine_parts(
        vec![
            StubAdapter::failing(
                "pylint",
                Language::Python,
                AdapterError::Unavailable("pylint not found on PATH".to_string()),
            ),
            StubAdapter::failing(
                "bandit",
                Language::Python,
                AdapterError::Unavailable("bandit not found on PATH".to_string()),
            ),
            StubAdapter::failing(
                "ml-review",
                Language::Python,
                AdapterError::Crash("endpoint returned 500".to_string()),
            ),
        ],
        ReviewConfig::default(),
    );

    let job = Arc::new(AnalysisJob::new("import os\n", Language::Python));
    let results = coordinator.analyze(Arc::clone(&job)).await;
    let report = aggregator.aggregate(&job.id, &results);

    assert_eq!(report.status(), ReportStatus::Failed);
    assert!(report.is_empty());
    assert_eq!(report.failures().len(), 3);
    assert_eq!(report.failures()["pylint"], "unavailable");
    assert_eq!(report.failures()["ml-review"], "crash");
}

/// An adapter abandoned at the global deadline is reported as
/// global_timeout and its late findings never reach the report.
#[tokio::test]
async fn global_timeout_discards_late_findings() {
    let config = ReviewConfig {
        adapter_timeout: Duration::from_secs(30),
        global_timeout: Duration::from_millis(60),
        ..Default::default()
    };
    let (coordinator, aggregator) = engine_parts(
        vec![
            StubAdapter::with_findings(
                "pylint",
                Language::Python,
                vec![finding("pylint", Category::Quality, Severity::Medium, "unused import", 1)],
            ),
            StubAdapter::sleeping("ml-review", Duration::from_secs(10)),
        ],
        config,
    );

    let job = Arc::new(AnalysisJob::new("import os\n", Language::Python));
    let results = coordinator.analyze(Arc::clone(&job)).await;
    let report = aggregator.aggregate(&job.id, &results);

    assert_eq!(report.status(), ReportStatus::Partial);
    assert_eq!(
        report.failures().get("ml-review").map(String::as_str),
        Some("global_timeout")
    );
    assert!(report
        .findings()
        .iter()
        .all(|f| f.message != "finding from after the deadline"));
}

/// Re-aggregating the same results map twice yields the same report.
#[tokio::test]
async fn aggregation_is_deterministic_across_runs() {
    let (coordinator, aggregator) = engine_parts(
        vec![
            StubAdapter::with_findings(
                "pylint",
                Language::Python,
                vec![
                    finding("pylint", Category::Bug, Severity::High, "undefined variable", 7),
                    finding("pylint", Category::Quality, Severity::Medium, "unused import", 1),
                ],
            ),
            StubAdapter::with_findings(
                "ml-review",
                Language::Python,
                vec![finding("ml-review", Category::Quality, Severity::Low, "Unused import", 1)],
            ),
        ],
        ReviewConfig::default(),
    );

    let job = Arc::new(AnalysisJob::new("import os\n", Language::Python));
    let results = coordinator.analyze(Arc::clone(&job)).await;

    let first = aggregator.aggregate(&job.id, &results);
    let second = aggregator.aggregate(&job.id, &results);

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(first.findings()).unwrap(),
        serde_json::to_string(second.findings()).unwrap()
    );
}

/// Only adapters for the declared language are dispatched at all.
#[tokio::test]
async fn language_filtering_skips_other_adapters() {
    let (coordinator, aggregator) = engine_parts(
        vec![
            StubAdapter::with_findings(
                "pylint",
                Language::Python,
                vec![finding("pylint", Category::Quality, Severity::Medium, "unused import", 1)],
            ),
            StubAdapter::with_findings(
                "eslint",
                Language::Javascript,
                vec![finding("eslint", Category::Bug, Severity::High, "'x' is not defined", 2)],
            ),
        ],
        ReviewConfig::default(),
    );

    let job = Arc::new(AnalysisJob::new("var x = 1;", Language::Javascript));
    let results = coordinator.analyze(Arc::clone(&job)).await;

    assert_eq!(results.len(), 1);
    assert!(results.contains_key("eslint"));

    // The skipped python adapter is not a failure, so the report is complete.
    let report = aggregator.aggregate(&job.id, &results);
    assert_eq!(report.status(), ReportStatus::Complete);
}
