use crate::core::{Category, Severity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl Location {
    pub fn new(line: u32) -> Self {
        Self { line, column: None }
    }

    pub fn with_column(mut self, column: u32) -> Self {
        self.column = Some(column);
        self
    }
}

/// One normalized issue reported by an analyzer. Category and severity are
/// always set; adapters that cannot classify a message fall back to their
/// documented defaults rather than omitting either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub source: String,

    pub category: Category,

    pub severity: Severity,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
}

impl Finding {
    pub fn new(
        source: impl Into<String>,
        category: Category,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        debug_assert!(!message.trim().is_empty(), "finding message must not be empty");
        Self {
            source: source.into(),
            category,
            severity,
            message,
            location: None,
            rule_id: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_line(self, line: u32) -> Self {
        self.with_location(Location::new(line))
    }

    pub fn with_rule_id(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }

    /// Line used for ordering and deduplication. Findings without a reported
    /// location normalize to 0 so the sort stays total.
    pub fn line(&self) -> u32 {
        self.location.map(|loc| loc.line).unwrap_or(0)
    }

    /// Lowercased message with all whitespace runs collapsed to single
    /// spaces. Duplicate detection compares these forms by containment.
    pub fn normalized_message(&self) -> String {
        self.message
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let finding = Finding::new("pylint", Category::Quality, Severity::Medium, "unused import")
            .with_location(Location::new(10).with_column(4))
            .with_rule_id("W0611");

        assert_eq!(finding.line(), 10);
        assert_eq!(finding.location.unwrap().column, Some(4));
        assert_eq!(finding.rule_id.as_deref(), Some("W0611"));
    }

    #[test]
    fn test_line_defaults_to_zero_without_location() {
        let finding = Finding::new("ml-review", Category::Refactor, Severity::Low, "general note");
        assert_eq!(finding.line(), 0);
    }

    #[test]
    fn test_normalized_message_collapses_whitespace_and_case() {
        let finding = Finding::new(
            "eslint",
            Category::Quality,
            Severity::Medium,
            "  Unused\tvariable   'x' ",
        );
        assert_eq!(finding.normalized_message(), "unused variable 'x'");
    }
}
