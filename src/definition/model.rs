//! Export configuration: the resolved, typed form of a definition
//!
//! An [`ExportConfig`] lists the requested output columns in order. Each
//! [`ColumnSpec`] reads either a record property or a template expression;
//! see [`ColumnSpec::source`] for the precedence rules.

use crate::domain::{Result, TabulaError};
use serde::Serialize;
use std::path::PathBuf;

/// Export name used when neither options nor preferences name one
pub const DEFAULT_EXPORT_NAME: &str = "default";

/// Date-time format used when neither the column nor the config declares one
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One requested output field
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ColumnSpec {
    /// Logical field key
    pub identifier: String,
    /// Semantic category used by the field resolver (`created_by`, `notes`, ...)
    pub field_type: Option<String>,
    /// Display label
    pub header: Option<String>,
    /// Record field read directly
    pub record_property: Option<String>,
    /// Template expression evaluated per record
    pub template_expr: Option<String>,
    /// Date-time format for this column
    pub datetime_format: Option<String>,
}

/// Where the cell value of a column comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource<'a> {
    /// Evaluated through the compiled template
    Template(&'a str),
    /// Read from the record field of this name
    Property(&'a str),
    /// No usable source; the column only contributes to the header row
    Unsourced,
}

impl ColumnSpec {
    /// Creates a column with only an identifier
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    /// Column reading `property`, labelled `header`
    pub fn property(header: impl Into<String>, property: impl Into<String>) -> Self {
        let property = property.into();
        Self::new(property.clone())
            .with_header(header)
            .with_record_property(property)
    }

    /// Sets the header
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Sets the record property
    pub fn with_record_property(mut self, property: impl Into<String>) -> Self {
        self.record_property = Some(property.into());
        self
    }

    /// Sets the template expression
    pub fn with_template(mut self, expr: impl Into<String>) -> Self {
        self.template_expr = Some(expr.into());
        self
    }

    /// Sets the semantic field type
    pub fn with_type(mut self, field_type: impl Into<String>) -> Self {
        self.field_type = Some(field_type.into());
        self
    }

    /// Sets the date-time format
    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = Some(format.into());
        self
    }

    /// Source of this column's cell values
    ///
    /// A template expression takes precedence over a record property. Empty
    /// strings count as absent.
    pub fn source(&self) -> ColumnSource<'_> {
        match (non_empty(&self.template_expr), non_empty(&self.record_property)) {
            (Some(expr), _) => ColumnSource::Template(expr),
            (None, Some(property)) => ColumnSource::Property(property),
            (None, None) => ColumnSource::Unsourced,
        }
    }

    /// Text of the generic header cell: header, else property name, else empty
    pub fn header_label(&self) -> &str {
        non_empty(&self.header)
            .or_else(|| non_empty(&self.record_property))
            .unwrap_or("")
    }
}

/// One `output key <- template result key` pair of a full-template export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingEntry {
    /// Named cell the value is routed to
    pub output_key: String,
    /// Key looked up in the template's JSON object
    pub template_key: String,
}

impl MappingEntry {
    /// Creates a mapping entry
    pub fn new(output_key: impl Into<String>, template_key: impl Into<String>) -> Self {
        Self {
            output_key: output_key.into(),
            template_key: template_key.into(),
        }
    }
}

/// Resolved export configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportConfig {
    /// Definition name
    pub name: String,
    /// Output format, e.g. `csv`
    pub format: Option<String>,
    /// Requested columns, in output order
    pub columns: Vec<ColumnSpec>,
    /// Whether a generic header row is written before the first data row
    pub write_generic_header: bool,
    /// External document template
    pub template: Option<PathBuf>,
    /// Output key mapping used with an external document template
    pub template_mapping: Vec<MappingEntry>,
    /// Date-time format for columns without their own
    pub datetime_format: Option<String>,
    /// Base name for the exported file
    pub export_filename: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::new(DEFAULT_EXPORT_NAME)
    }
}

impl ExportConfig {
    /// A config with no columns (record dump) and a generic header
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format: None,
            columns: Vec::new(),
            write_generic_header: true,
            template: None,
            template_mapping: Vec::new(),
            datetime_format: None,
            export_filename: None,
        }
    }

    /// Builder-style column setter
    pub fn with_columns(mut self, columns: Vec<ColumnSpec>) -> Self {
        self.columns = columns;
        self
    }

    /// Builder-style format setter
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Builder-style template setter
    pub fn with_template(mut self, template: impl Into<PathBuf>, mapping: Vec<MappingEntry>) -> Self {
        self.template = Some(template.into());
        self.template_mapping = mapping;
        self
    }

    /// Builder-style header flag setter
    pub fn with_generic_header(mut self, enabled: bool) -> Self {
        self.write_generic_header = enabled;
        self
    }

    /// True if explicit columns are configured
    pub fn has_columns(&self) -> bool {
        !self.columns.is_empty()
    }

    /// Template expressions of all columns, in column order
    pub fn template_expressions(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().filter_map(|c| match c.source() {
            ColumnSource::Template(expr) => Some(expr),
            _ => None,
        })
    }

    /// True if an external template or any column expression is configured
    pub fn requires_template(&self) -> bool {
        self.template.is_some() || self.template_expressions().next().is_some()
    }

    /// Date-time format for `column`, falling back to the config and then the default
    pub fn datetime_format_for<'a>(&'a self, column: Option<&'a ColumnSpec>) -> &'a str {
        column
            .and_then(|c| non_empty(&c.datetime_format))
            .or_else(|| non_empty(&self.datetime_format))
            .unwrap_or(DEFAULT_DATETIME_FORMAT)
    }

    /// Output format
    ///
    /// # Errors
    ///
    /// Returns [`TabulaError::FormatNotFound`] if the definition declares none.
    pub fn format(&self) -> Result<&str> {
        non_empty(&self.format).ok_or_else(|| TabulaError::FormatNotFound(self.name.clone()))
    }

    /// Download file name: the configured export file name, else `export_<app>`
    ///
    /// # Errors
    ///
    /// Returns [`TabulaError::FormatNotFound`] if no format is configured.
    pub fn download_filename(&self, application: &str) -> Result<String> {
        let format = self.format()?;
        Ok(match non_empty(&self.export_filename) {
            Some(base) => format!("{base}.{format}"),
            None => format!("export_{}.{format}", application.to_lowercase()),
        })
    }

    /// MIME type of the exported document
    ///
    /// # Errors
    ///
    /// Returns [`TabulaError::FormatNotFound`] if no format is configured.
    pub fn content_type(&self) -> Result<&'static str> {
        Ok(match self.format()?.to_ascii_lowercase().as_str() {
            "csv" => "text/csv",
            "ods" => "application/vnd.oasis.opendocument.spreadsheet",
            "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "pdf" => "application/pdf",
            _ => "application/octet-stream",
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_source_precedence() {
        let both = ColumnSpec::new("fn")
            .with_record_property("n_fn")
            .with_template("{{ record.n_fn }}");
        assert_eq!(both.source(), ColumnSource::Template("{{ record.n_fn }}"));

        let property = ColumnSpec::property("Name", "n_fn");
        assert_eq!(property.source(), ColumnSource::Property("n_fn"));

        let header_only = ColumnSpec::new("spacer").with_header("Notes");
        assert_eq!(header_only.source(), ColumnSource::Unsourced);

        let blank = ColumnSpec::new("x").with_record_property("  ");
        assert_eq!(blank.source(), ColumnSource::Unsourced);
    }

    #[test]
    fn test_header_label_fallbacks() {
        assert_eq!(ColumnSpec::property("Name", "n_fn").header_label(), "Name");
        assert_eq!(
            ColumnSpec::new("email").with_record_property("email").header_label(),
            "email"
        );
        assert_eq!(ColumnSpec::new("x").header_label(), "");
    }

    #[test]
    fn test_requires_template() {
        let plain = ExportConfig::new("plain")
            .with_columns(vec![ColumnSpec::property("Name", "name")]);
        assert!(!plain.requires_template());

        let expr = ExportConfig::new("expr")
            .with_columns(vec![ColumnSpec::new("age").with_template("{{ record.age }}")]);
        assert!(expr.requires_template());

        let doc = ExportConfig::new("doc").with_template("letter.j2", vec![]);
        assert!(doc.requires_template());
    }

    #[test]
    fn test_datetime_format_fallbacks() {
        let mut config = ExportConfig::new("dates");
        let column = ColumnSpec::new("created").with_datetime_format("%d.%m.%Y");

        assert_eq!(config.datetime_format_for(Some(&column)), "%d.%m.%Y");
        assert_eq!(config.datetime_format_for(None), DEFAULT_DATETIME_FORMAT);

        config.datetime_format = Some("%Y".to_string());
        assert_eq!(config.datetime_format_for(None), "%Y");
        assert_eq!(config.datetime_format_for(Some(&ColumnSpec::new("x"))), "%Y");
    }

    #[test]
    fn test_format_and_download_filename() {
        let config = ExportConfig::new("adb").with_format("csv");
        assert_eq!(config.format().unwrap(), "csv");
        assert_eq!(
            config.download_filename("Addressbook").unwrap(),
            "export_addressbook.csv"
        );

        assert_eq!(config.content_type().unwrap(), "text/csv");
        assert_eq!(
            ExportConfig::new("x").with_format("dat").content_type().unwrap(),
            "application/octet-stream"
        );

        let mut named = config.clone();
        named.export_filename = Some("contacts".to_string());
        assert_eq!(named.download_filename("Addressbook").unwrap(), "contacts.csv");

        let missing = ExportConfig::new("nofmt");
        assert!(matches!(
            missing.format(),
            Err(TabulaError::FormatNotFound(_))
        ));
    }
}
