use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Javascript,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Python => write!(f, "python"),
            Self::Javascript => write!(f, "javascript"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "python" | "py" => Ok(Self::Python),
            "javascript" | "js" => Ok(Self::Javascript),
            other => Err(format!("unsupported language: {}", other)),
        }
    }
}

impl Language {
    /// Detects the language from a file extension, for callers that did not
    /// declare one explicitly.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "py" => Some(Self::Python),
            "js" | "mjs" | "cjs" | "jsx" => Some(Self::Javascript),
            _ => None,
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::Python => "py",
            Self::Javascript => "js",
        }
    }
}

static JOB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// One submitted analysis request. Immutable once created; the coordinator
/// shares it read-only across adapter tasks, so no locking is needed during
/// dispatch. Jobs are not persisted — the id only has to be unique within
/// the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub id: String,
    pub language: Language,
    pub snippet: String,
    pub submitted_at: DateTime<Utc>,
}

impl AnalysisJob {
    pub fn new(snippet: impl Into<String>, language: Language) -> Self {
        let submitted_at = Utc::now();
        let seq = JOB_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self {
            id: format!("job-{}-{}", submitted_at.timestamp_millis(), seq),
            language,
            snippet: snippet.into(),
            submitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_aliases() {
        assert_eq!("py".parse::<Language>().unwrap(), Language::Python);
        assert_eq!("JS".parse::<Language>().unwrap(), Language::Javascript);
        assert!("ruby".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_from_path() {
        assert_eq!(
            Language::from_path(Path::new("app.py")),
            Some(Language::Python)
        );
        assert_eq!(
            Language::from_path(Path::new("index.mjs")),
            Some(Language::Javascript)
        );
        assert_eq!(Language::from_path(Path::new("main.rs")), None);
    }

    #[test]
    fn test_job_ids_are_unique_in_process() {
        let a = AnalysisJob::new("print(1)", Language::Python);
        let b = AnalysisJob::new("print(1)", Language::Python);
        assert_ne!(a.id, b.id);
    }
}
