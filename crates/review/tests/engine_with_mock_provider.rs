//! Full-engine tests with the mock inference provider: the ML adapter is
//! real, only the remote model call is canned.

use std::sync::Arc;
use tensaku_review::{
    AdapterRegistry, Category, Language, MlReviewAdapter, MockInferenceProvider, ReportStatus,
    ReviewConfig, ReviewEngine, Severity,
};

fn ml_only_engine(provider: MockInferenceProvider) -> ReviewEngine {
    let mut registry = AdapterRegistry::new();
    registry.register(MlReviewAdapter::new(Arc::new(provider)));
    ReviewEngine::new(Arc::new(registry), ReviewConfig::default())
}

#[tokio::test]
async fn model_bullets_become_ranked_findings() {
    let provider = MockInferenceProvider::new().with_response(
        "import hashlib",
        "Review of the snippet:\n\
         - line 2: password stored in plain text, critical security flaw\n\
         - line 5: unused import, minor readability issue\n\
         - Consider extracting the hashing logic into its own function\n",
    );
    let engine = ml_only_engine(provider);

    let report = engine
        .submit("import hashlib\npassword = 'hunter2'\n", Language::Python)
        .await
        .unwrap();

    assert_eq!(report.status(), ReportStatus::Complete);
    assert_eq!(report.findings().len(), 3);

    // Ranked: the critical security finding first.
    let first = &report.findings()[0];
    assert_eq!(first.category, Category::Security);
    assert_eq!(first.severity, Severity::High);
    assert_eq!(first.line(), 2);

    assert!(report
        .findings()
        .iter()
        .all(|f| f.source == "ml-review" && !f.message.is_empty()));
}

#[tokio::test]
async fn failing_provider_degrades_to_failed_report() {
    let engine = ml_only_engine(MockInferenceProvider::failing());

    let report = engine.submit("def f(): pass", Language::Python).await.unwrap();

    assert_eq!(report.status(), ReportStatus::Failed);
    assert!(report.is_empty());
    assert_eq!(
        report.failures().get("ml-review").map(String::as_str),
        Some("crash")
    );
}

#[tokio::test]
async fn prose_only_response_is_kept_verbatim() {
    let provider = MockInferenceProvider::new()
        .with_default_response("The code is straightforward and has no obvious problems.");
    let engine = ml_only_engine(provider);

    let report = engine.submit("print('hi')", Language::Python).await.unwrap();

    assert_eq!(report.status(), ReportStatus::Complete);
    assert_eq!(report.findings().len(), 1);
    let finding = &report.findings()[0];
    assert_eq!(finding.category, Category::Refactor);
    assert_eq!(finding.severity, Severity::Low);
    assert!(finding.message.contains("no obvious problems"));
}

#[test]
fn blocking_submit_works_without_a_runtime() {
    let provider =
        MockInferenceProvider::new().with_default_response("- line 1: unused variable warning");
    let engine = ml_only_engine(provider);

    let report = engine.submit_blocking("let x = 1;", Language::Javascript).unwrap();
    assert_eq!(report.status(), ReportStatus::Complete);
    assert_eq!(report.findings().len(), 1);
}
