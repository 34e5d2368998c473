//! Export summary and reporting
//!
//! This module defines the structure for tracking and reporting the result of
//! one export, including the non-fatal issues met on the way.

use crate::domain::ExportIssue;
use std::collections::HashMap;
use std::time::Duration;

/// Summary of an export operation
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    /// Exported model
    pub model: String,

    /// Name of the definition the export ran with
    pub definition: String,

    /// Number of records matching the filter
    pub total_count: usize,

    /// Number of pages processed
    pub pages: usize,

    /// Number of data rows written
    pub records_written: usize,

    /// Whether the generic header row was written
    pub header_written: bool,

    /// Whether the template footer pass produced a row
    pub footer_written: bool,

    /// Non-fatal issues by kind
    pub issues: HashMap<ExportIssue, usize>,

    /// Whether a shutdown signal stopped the export early
    pub interrupted: bool,

    /// Duration of the export
    pub duration: Duration,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new(model: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            definition: definition.into(),
            total_count: 0,
            pages: 0,
            records_written: 0,
            header_written: false,
            footer_written: false,
            issues: HashMap::new(),
            interrupted: false,
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Count one occurrence of `issue`
    pub fn record_issue(&mut self, issue: ExportIssue) {
        *self.issues.entry(issue).or_insert(0) += 1;
    }

    /// Occurrences of `issue`
    pub fn issue_count(&self, issue: ExportIssue) -> usize {
        self.issues.get(&issue).copied().unwrap_or(0)
    }

    /// Occurrences of all issues
    pub fn total_issues(&self) -> usize {
        self.issues.values().sum()
    }

    /// True if every matching record was written without issues
    pub fn is_clean(&self) -> bool {
        !self.interrupted && self.total_issues() == 0 && self.records_written == self.total_count
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            model = %self.model,
            definition = %self.definition,
            total = self.total_count,
            written = self.records_written,
            pages = self.pages,
            footer = self.footer_written,
            interrupted = self.interrupted,
            duration_ms = self.duration.as_millis() as u64,
            "Export summary"
        );

        if self.total_issues() > 0 {
            tracing::warn!(
                invalid_template_output = self.issue_count(ExportIssue::InvalidTemplateOutput),
                missing_mapped_value = self.issue_count(ExportIssue::MissingMappedValue),
                misconfigured_column = self.issue_count(ExportIssue::MisconfiguredColumn),
                "Export completed with issues"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_summary_creation() {
        let summary = ExportSummary::new("Addressbook_Model_Contact", "default");

        assert_eq!(summary.model, "Addressbook_Model_Contact");
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.records_written, 0);
        assert_eq!(summary.duration, Duration::from_secs(0));
        assert!(summary.issues.is_empty());
        assert!(summary.is_clean());
    }

    #[test]
    fn test_export_summary_with_duration() {
        let summary = ExportSummary::new("m", "d").with_duration(Duration::from_secs(120));

        assert_eq!(summary.duration, Duration::from_secs(120));
    }

    #[test]
    fn test_record_issue_counts_per_kind() {
        let mut summary = ExportSummary::new("m", "d");
        summary.record_issue(ExportIssue::MissingMappedValue);
        summary.record_issue(ExportIssue::MissingMappedValue);
        summary.record_issue(ExportIssue::MisconfiguredColumn);

        assert_eq!(summary.issue_count(ExportIssue::MissingMappedValue), 2);
        assert_eq!(summary.issue_count(ExportIssue::InvalidTemplateOutput), 0);
        assert_eq!(summary.total_issues(), 3);
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_interrupted_export_is_not_clean() {
        let mut summary = ExportSummary::new("m", "d");
        summary.interrupted = true;
        assert!(!summary.is_clean());
    }
}
