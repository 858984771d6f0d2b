//! Orchestration: registry, coordinator, aggregator, and the `ReviewEngine`
//! facade tying them together behind one submit call.

pub mod aggregator;
pub mod coordinator;
pub mod registry;

pub use aggregator::Aggregator;
pub use coordinator::ExecutionCoordinator;
pub use registry::AdapterRegistry;

use crate::core::{AnalysisJob, Language, Report, ReviewConfig};
use anyhow::{bail, Result};
use std::sync::Arc;
use tracing::info;

/// Entry point for the request layer: one call in, one report out. The
/// engine never surfaces adapter faults to the caller — degraded runs are
/// communicated through the report's status and failure set. The only
/// caller-visible error is an empty snippet.
pub struct ReviewEngine {
    coordinator: ExecutionCoordinator,
    aggregator: Aggregator,
}

impl ReviewEngine {
    pub fn new(registry: Arc<AdapterRegistry>, config: ReviewConfig) -> Self {
        Self {
            coordinator: ExecutionCoordinator::new(registry, config.clone()),
            aggregator: Aggregator::new(config),
        }
    }

    pub async fn submit(&self, snippet: &str, language: Language) -> Result<Report> {
        if snippet.trim().is_empty() {
            bail!("no code provided");
        }

        let job = Arc::new(AnalysisJob::new(snippet, language));
        info!(job_id = %job.id, %language, "analysis submitted");

        let results = self.coordinator.analyze(Arc::clone(&job)).await;
        let report = self.aggregator.aggregate(&job.id, &results);

        info!(
            job_id = %job.id,
            status = %report.status(),
            findings = report.findings().len(),
            failed_adapters = report.failures().len(),
            "analysis finished"
        );
        Ok(report)
    }

    /// Synchronous wrapper for callers without a runtime.
    pub fn submit_blocking(&self, snippet: &str, language: Language) -> Result<Report> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.submit(snippet, language))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::MockInferenceProvider;

    #[tokio::test]
    async fn test_empty_snippet_is_rejected() {
        let registry = Arc::new(AdapterRegistry::with_defaults(Arc::new(
            MockInferenceProvider::new(),
        )));
        let engine = ReviewEngine::new(registry, ReviewConfig::default());

        assert!(engine.submit("   \n", Language::Python).await.is_err());
    }
}
