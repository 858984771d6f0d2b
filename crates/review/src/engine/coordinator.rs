//! Concurrent fan-out over the registered adapters.
//!
//! Every adapter for the job's language runs as its own tokio task under two
//! deadlines: the per-adapter timeout enforced inside `Analyzer::run`, and a
//! job-global deadline enforced here. A task still running when the global
//! deadline expires is aborted and recorded as `global_timeout`; its late
//! output is discarded. Failures are isolated — all tasks are spawned before
//! any is awaited, so a crashed or stalled adapter never delays the others.

use crate::core::{AdapterError, AdapterResult, AnalysisJob, ReviewConfig};
use crate::engine::AdapterRegistry;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub struct ExecutionCoordinator {
    registry: Arc<AdapterRegistry>,
    config: ReviewConfig,
}

impl ExecutionCoordinator {
    pub fn new(registry: Arc<AdapterRegistry>, config: ReviewConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Runs every adapter supporting the job's language and collects one
    /// result per adapter. Adapters for the other language are not
    /// dispatched and do not appear in the map.
    pub async fn analyze(&self, job: Arc<AnalysisJob>) -> BTreeMap<String, AdapterResult> {
        let adapters = self.registry.for_language(job.language);
        info!(
            job_id = %job.id,
            language = %job.language,
            adapters = adapters.len(),
            "dispatching analyzers"
        );

        let deadline = Instant::now() + self.config.global_timeout;
        let adapter_timeout = self.config.adapter_timeout;

        let mut handles = Vec::with_capacity(adapters.len());
        for adapter in adapters {
            let id = adapter.id().to_string();
            let job = Arc::clone(&job);
            let handle =
                tokio::spawn(async move { adapter.run(&job, adapter_timeout).await });
            handles.push((id, handle));
        }

        // Tasks already run concurrently; awaiting them in order only decides
        // who we wait on first. Each await is clipped to what remains of the
        // global budget.
        let mut results = BTreeMap::new();
        for (id, mut handle) in handles {
            let remaining = deadline.saturating_duration_since(Instant::now());

            let result = match tokio::time::timeout(remaining, &mut handle).await {
                Ok(Ok(result)) => result,
                Ok(Err(join_err)) => {
                    warn!(adapter = %id, %join_err, "adapter task panicked");
                    AdapterResult::failure(AdapterError::Crash(join_err.to_string()))
                }
                Err(_) => {
                    warn!(adapter = %id, "global deadline expired, abandoning adapter");
                    handle.abort();
                    AdapterResult::failure(AdapterError::GlobalTimeout)
                }
            };

            debug!(
                adapter = %id,
                success = result.is_success(),
                findings = result.findings().len(),
                "adapter finished"
            );
            results.insert(id, result);
        }

        results
    }
}
