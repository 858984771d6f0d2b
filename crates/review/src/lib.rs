//! Tensaku Review — multi-analyzer code review engine
//!
//! Fans a submitted Python or JavaScript snippet out to independent
//! analyzers — pylint, bandit, ESLint, and a hosted text-generation model —
//! runs them concurrently under per-adapter and job-global deadlines, and
//! merges their heterogeneous outputs into one deduplicated,
//! severity-ranked report. Any subset of analyzers may fail; the caller
//! always gets a report.

pub mod adapters;
pub mod core;
pub mod engine;
pub mod inference;

pub use crate::core::{
    AdapterError, AdapterResult, AnalysisJob, Analyzer, Category, Finding, Language, Location,
    Report, ReportStatus, ReviewConfig, Severity,
};

pub use adapters::{BanditAdapter, EslintAdapter, MlReviewAdapter, PylintAdapter};

pub use engine::{AdapterRegistry, Aggregator, ExecutionCoordinator, ReviewEngine};

pub use inference::{HttpInferenceProvider, InferenceProvider, MockInferenceProvider};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
