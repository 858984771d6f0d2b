use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ReviewConfig {
    /// Deadline applied to each adapter individually.
    pub adapter_timeout: Duration,

    /// Job-wide deadline across all adapters. Tasks still running when it
    /// fires are recorded as failed with reason `global_timeout`.
    pub global_timeout: Duration,

    pub deduplication_enabled: bool,

    /// How far apart two line numbers may be while still counting as the
    /// "same location" during deduplication. 0 means exact-line only.
    pub dedup_line_tolerance: u32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            adapter_timeout: Duration::from_secs(30),
            global_timeout: Duration::from_secs(90),
            deduplication_enabled: true,
            dedup_line_tolerance: 0,
        }
    }
}
