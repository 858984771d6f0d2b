//! The adapter seam: every analyzer, static or ML-backed, sits behind the
//! `Analyzer` trait and hands the coordinator an `AdapterResult`. Raw tool
//! errors never cross this boundary — the provided `run` method converts
//! them all into typed failures.

use crate::core::{AnalysisJob, Finding, Language};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("analyzer crashed: {0}")]
    Crash(String),

    #[error("analyzer unavailable: {0}")]
    Unavailable(String),

    #[error("malformed analyzer output: {0}")]
    MalformedOutput(String),

    #[error("job deadline expired before the analyzer finished")]
    GlobalTimeout,
}

impl AdapterError {
    /// Stable short reason recorded in the report's failure set.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Crash(_) => "crash",
            Self::Unavailable(_) => "unavailable",
            Self::MalformedOutput(_) => "malformed_output",
            Self::GlobalTimeout => "global_timeout",
        }
    }
}

/// Outcome of one adapter execution for one job.
#[derive(Debug, Clone)]
pub enum AdapterResult {
    Success(Vec<Finding>),
    Failure {
        error: AdapterError,
        partial: Vec<Finding>,
    },
}

impl AdapterResult {
    pub fn failure(error: AdapterError) -> Self {
        Self::Failure {
            error,
            partial: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Findings contributed to aggregation: all of a success, whatever a
    /// failure salvaged before going down.
    pub fn findings(&self) -> &[Finding] {
        match self {
            Self::Success(findings) => findings,
            Self::Failure { partial, .. } => partial,
        }
    }

    pub fn error(&self) -> Option<&AdapterError> {
        match self {
            Self::Success(_) => None,
            Self::Failure { error, .. } => Some(error),
        }
    }
}

#[async_trait]
pub trait Analyzer: Send + Sync {
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        "No description provided"
    }

    fn supports(&self, language: Language) -> bool;

    /// Runs the underlying tool and normalizes its output. Implementations
    /// report problems through `AdapterError`; timeout enforcement lives in
    /// `run`.
    async fn analyze(&self, job: &AnalysisJob) -> Result<Vec<Finding>, AdapterError>;

    /// Executes `analyze` under the per-adapter deadline. A job in the wrong
    /// language is a no-op success, not a failure.
    async fn run(&self, job: &AnalysisJob, timeout: Duration) -> AdapterResult {
        if !self.supports(job.language) {
            return AdapterResult::Success(Vec::new());
        }

        match tokio::time::timeout(timeout, self.analyze(job)).await {
            Ok(Ok(findings)) => AdapterResult::Success(findings),
            Ok(Err(error)) => {
                warn!(adapter = self.id(), %error, "adapter failed");
                AdapterResult::failure(error)
            }
            Err(_) => {
                warn!(adapter = self.id(), ?timeout, "adapter timed out");
                AdapterResult::failure(AdapterError::Timeout(timeout))
            }
        }
    }
}
