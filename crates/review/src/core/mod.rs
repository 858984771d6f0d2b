//! Core abstractions of the review engine.
//!
//! Everything the coordinator and aggregator depend on lives here: the
//! normalized `Finding` shape, the immutable `AnalysisJob`, the `Analyzer`
//! trait adapters implement, and the `Report` handed to the presentation
//! layer. Adapters own their tool-specific parsing and mapping tables;
//! nothing above this layer ever sees a tool's native output format.

pub mod adapter;
pub mod config;
pub mod finding;
pub mod job;
pub mod report;
pub mod severity;

pub use adapter::{AdapterError, AdapterResult, Analyzer};
pub use config::ReviewConfig;
pub use finding::{Finding, Location};
pub use job::{AnalysisJob, Language};
pub use report::{Report, ReportStatus, SeverityCount};
pub use severity::{Category, Severity};
