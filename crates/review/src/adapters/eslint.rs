use crate::adapters::{run_tool, write_snippet};
use crate::core::{
    AdapterError, AnalysisJob, Analyzer, Category, Finding, Language, Location, Severity,
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Runs ESLint through npx and maps rule families onto categories. ESLint
/// only knows two severities (warn/error); the category comes from the rule
/// id.
pub struct EslintAdapter;

pub const ESLINT_ID: &str = "eslint";

/// Inline rule set for the isolated run. The snippet lives in a bare temp
/// file, so no project config exists; without `--no-eslintrc` and an inline
/// config ESLint refuses to run and exits 2.
const ESLINT_RULES: &str = concat!(
    r#"{"no-undef": 2, "no-unused-vars": 1, "no-unreachable": 2, "#,
    r#""no-dupe-keys": 2, "no-dupe-args": 2, "use-isnan": 2, "valid-typeof": 2, "#,
    r#""no-cond-assign": 2, "no-constant-condition": 1, "no-eval": 2, "#,
    r#""complexity": ["warn", 10]}"#
);

fn tool_args(path: &str) -> Vec<&str> {
    vec![
        "--no-install",
        "eslint",
        "--no-eslintrc",
        "--no-ignore",
        "--env",
        "es2021",
        "--parser-options",
        "ecmaVersion:2021",
        "--rule",
        ESLINT_RULES,
        "--format",
        "json",
        path,
    ]
}

#[derive(Debug, Deserialize)]
struct EslintFileResult {
    #[serde(default)]
    messages: Vec<EslintMessage>,
}

#[derive(Debug, Deserialize)]
struct EslintMessage {
    #[serde(default)]
    #[serde(rename = "ruleId")]
    rule_id: Option<String>,
    severity: u8,
    message: String,
    #[serde(default)]
    line: Option<u32>,
    #[serde(default)]
    column: Option<u32>,
}

/// Category table by rule family. ESLint's correctness rules are bugs,
/// security-plugin rules are security, complexity limits are refactors, and
/// the long tail of style rules is quality.
fn map_rule(rule_id: Option<&str>) -> Category {
    let Some(rule) = rule_id else {
        // A missing ruleId is a parse error in the input, which is a bug in
        // the submitted code, not a style nit.
        return Category::Bug;
    };

    if rule.starts_with("security/") || rule.starts_with("no-eval") {
        return Category::Security;
    }

    match rule {
        "no-undef" | "no-unreachable" | "no-dupe-keys" | "no-dupe-args" | "use-isnan"
        | "valid-typeof" | "no-cond-assign" | "no-constant-condition" => Category::Bug,
        "complexity" | "max-depth" | "max-lines" | "max-statements" | "max-params" => {
            Category::Refactor
        }
        _ => Category::Quality,
    }
}

fn map_severity(level: u8) -> Severity {
    match level {
        2 => Severity::High,
        1 => Severity::Medium,
        _ => Severity::Medium,
    }
}

fn parse_output(stdout: &str) -> Result<Vec<Finding>, AdapterError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let files: Vec<EslintFileResult> = serde_json::from_str(trimmed)
        .map_err(|e| AdapterError::MalformedOutput(format!("eslint JSON parse failed: {}", e)))?;

    let findings = files
        .into_iter()
        .flat_map(|file| file.messages)
        .filter(|m| !m.message.trim().is_empty())
        .map(|m| {
            let category = map_rule(m.rule_id.as_deref());
            let severity = map_severity(m.severity);
            let mut finding = Finding::new(ESLINT_ID, category, severity, m.message);
            if let Some(line) = m.line {
                let mut location = Location::new(line);
                if let Some(column) = m.column {
                    location = location.with_column(column);
                }
                finding = finding.with_location(location);
            }
            if let Some(rule) = m.rule_id {
                finding = finding.with_rule_id(rule);
            }
            finding
        })
        .collect();

    Ok(findings)
}

#[async_trait]
impl Analyzer for EslintAdapter {
    fn id(&self) -> &'static str {
        ESLINT_ID
    }

    fn name(&self) -> &'static str {
        "ESLint"
    }

    fn description(&self) -> &'static str {
        "JavaScript linting via npx eslint"
    }

    fn supports(&self, language: Language) -> bool {
        language == Language::Javascript
    }

    async fn analyze(&self, job: &AnalysisJob) -> Result<Vec<Finding>, AdapterError> {
        let file = write_snippet(&job.snippet, job.language)?;
        let path = file.path().to_string_lossy().to_string();

        let output = run_tool("npx", &tool_args(path.as_str())).await?;

        // Exit 0: clean. Exit 1: lint findings, report on stdout. Exit >= 2:
        // ESLint itself failed.
        let code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout);
        if code != 0 && code != 1 {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AdapterError::Crash(format!(
                "eslint exited with {}: {}",
                code,
                stderr.trim()
            )));
        }

        let findings = parse_output(&stdout)?;
        debug!(count = findings.len(), "eslint findings");
        Ok(findings)
    }
}
