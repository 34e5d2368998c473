//! Domain error types
//!
//! This module defines the error hierarchy for Tabula. Structural errors
//! (the export cannot start or a collaborator failed) are [`TabulaError`]s
//! and propagate to the caller. Per-record data problems are [`ExportIssue`]s:
//! they are logged, counted and never abort an export.

use std::fmt;
use thiserror::Error;

/// Main Tabula error type
///
/// All errors are domain-specific and don't expose third-party types.
#[derive(Debug, Error)]
pub enum TabulaError {
    /// No export definition could be resolved for the model
    #[error("Export definition not found: {0}")]
    ConfigNotFound(String),

    /// The export configuration declares no output format
    #[error("Format string not found for export definition '{0}'")]
    FormatNotFound(String),

    /// A definition document is malformed
    #[error("Definition error: {0}")]
    Definition(String),

    /// A template could not be read or compiled
    #[error("Template error: {0}")]
    Template(String),

    /// The record source failed
    #[error("Record source error: {0}")]
    Source(String),

    /// A resolution collaborator (users, notes, containers) failed
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// The row sink failed to write or finalize the document
    #[error("Sink error: {0}")]
    Sink(String),

    /// Application configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Kinds of non-fatal problems met while rendering rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportIssue {
    /// Template evaluation did not yield the expected JSON container
    InvalidTemplateOutput,
    /// An expected slot or key is absent from the template result
    MissingMappedValue,
    /// A column has no usable source
    MisconfiguredColumn,
}

impl ExportIssue {
    /// Stable name used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportIssue::InvalidTemplateOutput => "invalid_template_output",
            ExportIssue::MissingMappedValue => "missing_mapped_value",
            ExportIssue::MisconfiguredColumn => "misconfigured_column",
        }
    }
}

impl fmt::Display for ExportIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<std::io::Error> for TabulaError {
    fn from(err: std::io::Error) -> Self {
        TabulaError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TabulaError {
    fn from(err: serde_json::Error) -> Self {
        TabulaError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for TabulaError {
    fn from(err: toml::de::Error) -> Self {
        TabulaError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<quick_xml::DeError> for TabulaError {
    fn from(err: quick_xml::DeError) -> Self {
        TabulaError::Definition(format!("XML parse error: {err}"))
    }
}

impl From<minijinja::Error> for TabulaError {
    fn from(err: minijinja::Error) -> Self {
        TabulaError::Template(err.to_string())
    }
}

impl From<csv::Error> for TabulaError {
    fn from(err: csv::Error) -> Self {
        TabulaError::Sink(err.to_string())
    }
}
