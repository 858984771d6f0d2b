//! One module per analyzer. Each adapter owns its tool invocation, its
//! output parser, and its severity/category mapping table; the rest of the
//! engine only ever sees `Finding`s.

pub mod bandit;
pub mod eslint;
pub mod ml;
pub mod pylint;

pub use bandit::BanditAdapter;
pub use eslint::EslintAdapter;
pub use ml::MlReviewAdapter;
pub use pylint::PylintAdapter;

use crate::core::{AdapterError, Language};
use std::io::Write;
use std::process::Output;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::debug;

/// Writes the snippet to a temp file with the language's extension. The
/// returned handle deletes the file on drop, so callers keep it alive for
/// the duration of the tool run.
pub(crate) fn write_snippet(snippet: &str, language: Language) -> Result<NamedTempFile, AdapterError> {
    let mut file = tempfile::Builder::new()
        .prefix("tensaku-")
        .suffix(&format!(".{}", language.file_extension()))
        .tempfile()
        .map_err(|e| AdapterError::Crash(format!("temp file creation failed: {}", e)))?;

    file.write_all(snippet.as_bytes())
        .map_err(|e| AdapterError::Crash(format!("temp file write failed: {}", e)))?;

    Ok(file)
}

/// Spawns an external tool and waits for it. A missing binary is
/// `Unavailable`; any other spawn failure is `Crash`. Exit-status policy is
/// the caller's, since the lint tools signal findings through non-zero exits.
pub(crate) async fn run_tool(program: &str, args: &[&str]) -> Result<Output, AdapterError> {
    debug!(%program, ?args, "invoking analyzer tool");

    Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AdapterError::Unavailable(format!("{} not found on PATH", program))
            } else {
                AdapterError::Crash(format!("failed to run {}: {}", program, e))
            }
        })
}
