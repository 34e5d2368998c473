//! Export session state
//!
//! An [`ExportSession`] lives for exactly one `generate` call. It fixes the
//! [`RenderMode`] and the export timestamp when it opens and tracks the
//! first-page and completion flags while pages are written.

use super::header::write_generic_header;
use super::row::RowProcessor;
use super::summary::ExportSummary;
use crate::adapters::sink::RowSink;
use crate::core::template::{synthesize_column_source, CompiledTemplate, TemplateEngine};
use crate::definition::{ExportConfig, MappingEntry};
use crate::domain::context::ResultExt;
use crate::domain::{Account, Branding, ModelSchema, RecordBatch, Result};

/// Name the synthesized column template is compiled under
pub const COLUMN_TEMPLATE_NAME: &str = "columns";

/// Who exports and under which branding
#[derive(Debug, Clone)]
pub struct ExportContext {
    /// Exporting account
    pub account: Account,
    /// Installation branding
    pub branding: Branding,
}

impl ExportContext {
    /// Creates a context with empty branding
    pub fn new(account: Account) -> Self {
        Self {
            account,
            branding: Branding::default(),
        }
    }

    /// Sets the branding
    pub fn with_branding(mut self, branding: Branding) -> Self {
        self.branding = branding;
        self
    }
}

/// How rows are produced, chosen once per session
pub enum RenderMode {
    /// Every model field, in schema order
    Dump,
    /// Configured columns; expression columns read the compiled column template
    ColumnTemplate {
        /// Compiled `[...]` template, absent when no column has an expression
        template: Option<Box<dyn CompiledTemplate>>,
    },
    /// A document template whose JSON object is routed through named cells
    FullTemplate {
        /// Compiled document template
        template: Box<dyn CompiledTemplate>,
        /// Output key mapping
        mapping: Vec<MappingEntry>,
    },
}

impl RenderMode {
    /// Selects and compiles the mode for `config`
    ///
    /// An explicit document template wins over columns; a config with
    /// neither dumps records.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::TabulaError::Template`] if a template does not
    /// compile and [`crate::domain::TabulaError::Io`] if the template file
    /// cannot be read.
    pub async fn select(config: &ExportConfig, engine: &dyn TemplateEngine) -> Result<Self> {
        if let Some(path) = &config.template {
            let source = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading template {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string());

            if config.template_mapping.is_empty() {
                tracing::warn!(template = %name, "Document template has no output mapping");
            }

            return Ok(RenderMode::FullTemplate {
                template: engine.compile(&name, &source)?,
                mapping: config.template_mapping.clone(),
            });
        }

        if !config.has_columns() {
            return Ok(RenderMode::Dump);
        }

        let template = if config.requires_template() {
            let source = synthesize_column_source(config.template_expressions());
            tracing::debug!(source = %source, "Synthesized column template");
            Some(engine.compile(COLUMN_TEMPLATE_NAME, &source)?)
        } else {
            None
        };
        Ok(RenderMode::ColumnTemplate { template })
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            RenderMode::Dump => "dump",
            RenderMode::ColumnTemplate { .. } => "column_template",
            RenderMode::FullTemplate { .. } => "full_template",
        }
    }

    /// True if rows go through a compiled template
    pub fn uses_template(&self) -> bool {
        matches!(
            self,
            RenderMode::ColumnTemplate { template: Some(_) } | RenderMode::FullTemplate { .. }
        )
    }
}

/// State of one export run
pub struct ExportSession<'a> {
    config: &'a ExportConfig,
    context: &'a ExportContext,
    schema: ModelSchema,
    mode: RenderMode,
    first_iteration: bool,
    iteration_done: bool,
    timestamp_text: String,
}

impl<'a> ExportSession<'a> {
    /// Opens a session; the export timestamp is taken here
    pub fn new(
        config: &'a ExportConfig,
        context: &'a ExportContext,
        schema: ModelSchema,
        mode: RenderMode,
    ) -> Self {
        let export_timestamp = context.account.timezone.now();
        Self {
            config,
            context,
            schema,
            mode,
            first_iteration: true,
            iteration_done: false,
            timestamp_text: export_timestamp.to_rfc3339(),
        }
    }

    /// True once [`ExportSession::finish`] ran
    pub fn is_complete(&self) -> bool {
        self.iteration_done
    }

    fn rows(&self) -> RowProcessor<'_> {
        RowProcessor::new(
            self.config,
            &self.context.account,
            &self.context.branding,
            &self.schema,
            &self.mode,
            &self.timestamp_text,
        )
    }

    /// Writes one resolved page: the generic header on the first page, then
    /// one row per record
    pub fn process_page<S: RowSink>(
        &mut self,
        sink: &mut S,
        batch: &RecordBatch,
        summary: &mut ExportSummary,
    ) -> Result<()> {
        if self.first_iteration && self.config.write_generic_header {
            write_generic_header(sink, self.config, &self.schema)?;
            summary.header_written = true;
        }

        let rows = self.rows();
        for record in batch {
            rows.write_record(sink, record, summary)?;
            summary.records_written += 1;
        }

        self.first_iteration = false;
        Ok(())
    }

    /// Runs the footer pass when a template is in use and marks the session complete
    pub fn finish<S: RowSink>(&mut self, sink: &mut S, summary: &mut ExportSummary) -> Result<()> {
        if self.mode.uses_template() {
            summary.footer_written = self.rows().write_footer(sink)?;
        }
        self.iteration_done = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sink::TableSink;
    use crate::core::template::MiniJinjaEngine;
    use crate::definition::ColumnSpec;
    use crate::domain::{ModelName, Record};

    fn schema() -> ModelSchema {
        ModelSchema::new(ModelName::new("Addressbook_Model_Contact").unwrap(), ["id", "name"])
    }

    #[tokio::test]
    async fn test_session_header_once_then_complete() {
        let config = ExportConfig::new("x").with_columns(vec![ColumnSpec::property("Name", "name")]);
        let context = ExportContext::new(Account::new("acc", "Exporter"));
        let mode = RenderMode::select(&config, &MiniJinjaEngine::new()).await.unwrap();
        assert_eq!(mode.name(), "column_template");
        assert!(!mode.uses_template());

        let mut session = ExportSession::new(&config, &context, schema(), mode);
        let mut sink = TableSink::new();
        let mut summary = ExportSummary::new("m", "x");

        let page = RecordBatch::new(vec![Record::new("1").with("name", "Alice")]);
        session.process_page(&mut sink, &page, &mut summary).unwrap();
        session.process_page(&mut sink, &page, &mut summary).unwrap();
        assert!(!session.is_complete());

        session.finish(&mut sink, &mut summary).unwrap();
        assert!(session.is_complete());
        assert!(!summary.footer_written);

        let table = sink.finalize().unwrap();
        assert_eq!(table.cells(), vec![vec!["Name"], vec!["Alice"], vec!["Alice"]]);
        assert_eq!(summary.records_written, 2);
    }

    #[test]
    fn test_timestamp_in_account_timezone() {
        let config = ExportConfig::new("x");
        let account = Account::new("acc", "Exporter")
            .with_timezone(chrono::FixedOffset::east_opt(5 * 3600).unwrap());
        let context = ExportContext::new(account);

        let session = ExportSession::new(&config, &context, schema(), RenderMode::Dump);
        assert!(session.timestamp_text.ends_with("+05:00"));
    }
}
