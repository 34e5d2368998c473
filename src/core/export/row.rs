//! Row processor
//!
//! Turns one record into one row of cells according to the session's
//! [`RenderMode`]. Data problems never fail a row: they are logged, counted
//! as an [`ExportIssue`] and the affected cells are written empty. Only sink
//! failures propagate.

use super::session::RenderMode;
use super::summary::ExportSummary;
use crate::adapters::sink::RowSink;
use crate::core::format::{json_to_display_string, to_display_string};
use crate::core::template::{CompiledTemplate, ExportInfo, TemplateContext};
use crate::definition::{ColumnSource, ExportConfig, MappingEntry};
use crate::domain::{Account, Branding, ExportIssue, ModelSchema, Record, Result};
use serde_json::{Map, Value};

/// Writes rows for one session
pub struct RowProcessor<'s> {
    config: &'s ExportConfig,
    account: &'s Account,
    branding: &'s Branding,
    schema: &'s ModelSchema,
    mode: &'s RenderMode,
    timestamp: &'s str,
}

impl<'s> RowProcessor<'s> {
    /// Creates a processor over borrowed session state
    pub fn new(
        config: &'s ExportConfig,
        account: &'s Account,
        branding: &'s Branding,
        schema: &'s ModelSchema,
        mode: &'s RenderMode,
        timestamp: &'s str,
    ) -> Self {
        Self {
            config,
            account,
            branding,
            schema,
            mode,
            timestamp,
        }
    }

    /// Writes one record as one row
    pub fn write_record<S: RowSink>(
        &self,
        sink: &mut S,
        record: &Record,
        summary: &mut ExportSummary,
    ) -> Result<()> {
        sink.start_row()?;
        match self.mode {
            RenderMode::Dump => self.write_dump(sink, record)?,
            RenderMode::ColumnTemplate { template } => {
                let slots = match template {
                    Some(template) => self.render_array(template.as_ref(), record, summary),
                    None => Some(Vec::new()),
                };
                self.write_columns(sink, Some(record), slots.as_deref(), Some(summary))?;
            }
            RenderMode::FullTemplate { template, mapping } => {
                if let Some(object) = self.render_object(template.as_ref(), record, summary) {
                    self.write_mapped(sink, &object, mapping, Some(summary))?;
                }
            }
        }
        sink.end_row()
    }

    /// Renders the template once without a record and writes the result as a
    /// trailing row
    ///
    /// Nothing is written unless the result has the expected shape and at
    /// least one non-empty value. Returns whether a row was written.
    pub fn write_footer<S: RowSink>(&self, sink: &mut S) -> Result<bool> {
        match self.mode {
            RenderMode::Dump | RenderMode::ColumnTemplate { template: None } => Ok(false),
            RenderMode::ColumnTemplate {
                template: Some(template),
            } => {
                let slots = match self.render_json(template.as_ref(), None) {
                    Some(Value::Array(slots)) => slots,
                    _ => return Ok(skip_footer()),
                };
                if !slots.iter().any(has_content) {
                    return Ok(skip_footer());
                }
                sink.start_row()?;
                self.write_columns(sink, None, Some(&slots), None)?;
                sink.end_row()?;
                Ok(true)
            }
            RenderMode::FullTemplate { template, mapping } => {
                let object = match self.render_json(template.as_ref(), None) {
                    Some(Value::Object(object)) => object,
                    _ => return Ok(skip_footer()),
                };
                let mut mapped = mapping
                    .iter()
                    .filter_map(|entry| object.get(&entry.template_key));
                if !mapped.any(has_content) {
                    return Ok(skip_footer());
                }
                sink.start_row()?;
                self.write_mapped(sink, &object, mapping, None)?;
                sink.end_row()?;
                Ok(true)
            }
        }
    }

    fn write_dump<S: RowSink>(&self, sink: &mut S, record: &Record) -> Result<()> {
        let format = self.config.datetime_format_for(None);
        for field in &self.schema.fields {
            sink.write_value(&to_display_string(
                record.get(field),
                format,
                self.account,
            ))?;
        }
        Ok(())
    }

    /// `slots` is `None` when the template output was unusable; its cells
    /// are written empty without further warnings
    fn write_columns<S: RowSink>(
        &self,
        sink: &mut S,
        record: Option<&Record>,
        slots: Option<&[Value]>,
        mut summary: Option<&mut ExportSummary>,
    ) -> Result<()> {
        let mut slot_index = 0;
        for column in &self.config.columns {
            match column.source() {
                ColumnSource::Template(expr) => {
                    let value = match slots {
                        Some(slots) => match slots.get(slot_index) {
                            Some(value) => json_to_display_string(value),
                            None => {
                                if let Some(summary) = summary.as_deref_mut() {
                                    tracing::warn!(
                                        issue = %ExportIssue::MissingMappedValue,
                                        column = %column.identifier,
                                        expression = expr,
                                        slot = slot_index,
                                        "Template column not found in template result"
                                    );
                                    summary.record_issue(ExportIssue::MissingMappedValue);
                                }
                                String::new()
                            }
                        },
                        None => String::new(),
                    };
                    slot_index += 1;
                    sink.write_value(&value)?;
                }
                ColumnSource::Property(property) => {
                    let value = match record {
                        Some(record) => to_display_string(
                            record.get(property),
                            self.config.datetime_format_for(Some(column)),
                            self.account,
                        ),
                        None => String::new(),
                    };
                    sink.write_value(&value)?;
                }
                ColumnSource::Unsourced => {
                    if let Some(summary) = summary.as_deref_mut() {
                        tracing::info!(
                            issue = %ExportIssue::MisconfiguredColumn,
                            column = %column.identifier,
                            "Column has neither a record property nor an expression, skipping"
                        );
                        summary.record_issue(ExportIssue::MisconfiguredColumn);
                    }
                }
            }
        }
        Ok(())
    }

    fn write_mapped<S: RowSink>(
        &self,
        sink: &mut S,
        object: &Map<String, Value>,
        mapping: &[MappingEntry],
        mut summary: Option<&mut ExportSummary>,
    ) -> Result<()> {
        for entry in mapping {
            let value = match object.get(&entry.template_key) {
                Some(value) => json_to_display_string(value),
                None => {
                    if let Some(summary) = summary.as_deref_mut() {
                        tracing::warn!(
                            issue = %ExportIssue::MissingMappedValue,
                            key = %entry.template_key,
                            output = %entry.output_key,
                            "Mapped key not found in template result"
                        );
                        summary.record_issue(ExportIssue::MissingMappedValue);
                    }
                    String::new()
                }
            };
            sink.set_value(&entry.output_key, &value)?;
        }
        Ok(())
    }

    fn render_array(
        &self,
        template: &dyn CompiledTemplate,
        record: &Record,
        summary: &mut ExportSummary,
    ) -> Option<Vec<Value>> {
        match self.render_json(template, Some(record)) {
            Some(Value::Array(slots)) => Some(slots),
            other => {
                invalid_output(record, "array", other.as_ref(), summary);
                None
            }
        }
    }

    fn render_object(
        &self,
        template: &dyn CompiledTemplate,
        record: &Record,
        summary: &mut ExportSummary,
    ) -> Option<Map<String, Value>> {
        match self.render_json(template, Some(record)) {
            Some(Value::Object(object)) => Some(object),
            other => {
                invalid_output(record, "object", other.as_ref(), summary);
                None
            }
        }
    }

    /// Renders and parses; `None` if rendering or parsing failed
    fn render_json(&self, template: &dyn CompiledTemplate, record: Option<&Record>) -> Option<Value> {
        let context = TemplateContext {
            record,
            branding: self.branding,
            export: ExportInfo {
                timestamp: self.timestamp,
                account: self.account,
            },
        };

        let output = match template.render(&context) {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(
                    record_id = record.map(Record::id),
                    error = %e,
                    "Template rendering failed"
                );
                return None;
            }
        };

        match serde_json::from_str(&output) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(error = %e, output = %output, "Template output is not JSON");
                None
            }
        }
    }
}

fn invalid_output(record: &Record, expected: &str, got: Option<&Value>, summary: &mut ExportSummary) {
    tracing::warn!(
        issue = %ExportIssue::InvalidTemplateOutput,
        record_id = record.id(),
        expected,
        got = ?got,
        "Template did not return a JSON {expected}"
    );
    summary.record_issue(ExportIssue::InvalidTemplateOutput);
}

fn has_content(value: &Value) -> bool {
    !json_to_display_string(value).is_empty()
}

fn skip_footer() -> bool {
    tracing::debug!("Template footer pass produced no content");
    false
}
