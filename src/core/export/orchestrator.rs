//! Export orchestrator - drives one export from records to document
//!
//! For every export the orchestrator:
//! 1. selects and compiles the [`RenderMode`]
//! 2. opens a paged iterator over the matching records
//! 3. per page: resolves references, writes the header (first page only)
//!    and one row per record
//! 4. runs the template footer pass and finalizes the sink
//!
//! Pages are processed strictly one after another. A shutdown signal is
//! honoured between pages only; an interrupted export skips the footer pass
//! but still finalizes its sink.

use super::iterator::RecordIterator;
use super::session::{ExportContext, ExportSession, RenderMode};
use super::summary::ExportSummary;
use crate::adapters::sink::RowSink;
use crate::adapters::traits::RecordSource;
use crate::core::resolve::FieldResolver;
use crate::core::template::TemplateEngine;
use crate::definition::{ColumnConfigLoader, ExportConfig, ExportOptions};
use crate::domain::{RecordFilter, Result, SortSpec};
use crate::{log_export_complete, log_export_start, log_page_processing};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Records fetched per page unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Finished document plus the export summary
#[derive(Debug)]
pub struct ExportOutcome<D> {
    /// Document returned by the sink
    pub document: D,
    /// Summary of the run
    pub summary: ExportSummary,
}

/// Export orchestrator
pub struct ExportOrchestrator {
    source: Arc<dyn RecordSource>,
    resolver: FieldResolver,
    engine: Arc<dyn TemplateEngine>,
    context: ExportContext,
    page_size: usize,
    shutdown: Option<watch::Receiver<bool>>,
}

impl ExportOrchestrator {
    /// Create a new export orchestrator
    pub fn new(
        source: Arc<dyn RecordSource>,
        resolver: FieldResolver,
        engine: Arc<dyn TemplateEngine>,
        context: ExportContext,
    ) -> Self {
        Self {
            source,
            resolver,
            engine,
            context,
            page_size: DEFAULT_PAGE_SIZE,
            shutdown: None,
        }
    }

    /// Sets the number of records per page
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Stops exports between pages once `shutdown` turns true
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Loads the configuration for the filter's model, then runs [`Self::generate`]
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::TabulaError::ConfigNotFound`] before any
    /// sink call if no definition can be resolved.
    pub async fn export<S: RowSink>(
        &self,
        loader: &ColumnConfigLoader,
        options: &ExportOptions,
        filter: &RecordFilter,
        sort: Option<&SortSpec>,
        sink: S,
    ) -> Result<ExportOutcome<S::Document>> {
        let config = loader.load(&filter.model, options).await?;
        self.generate(filter, sort, &config, sink).await
    }

    /// Exports the records matching `filter` into `sink`
    ///
    /// Zero matching records is not an error; the document then holds no
    /// rows.
    ///
    /// # Errors
    ///
    /// Fails on template compile errors and on record source, resolver or
    /// sink failures. Per-record data problems are counted in the summary
    /// instead.
    pub async fn generate<S: RowSink>(
        &self,
        filter: &RecordFilter,
        sort: Option<&SortSpec>,
        config: &ExportConfig,
        mut sink: S,
    ) -> Result<ExportOutcome<S::Document>> {
        let start_time = Instant::now();
        let mut summary = ExportSummary::new(filter.model.as_str(), config.name.as_str());

        log_export_start!(filter.model, config.name);
        tracing::debug!(filter = ?filter, sort = ?sort, "Export parameters");

        let schema = self.source.schema(&filter.model).await?;
        let mode = RenderMode::select(config, self.engine.as_ref()).await?;
        tracing::debug!(mode = mode.name(), "Render mode selected");

        let mut session = ExportSession::new(config, &self.context, schema, mode);
        let mut pages =
            RecordIterator::open(self.source.as_ref(), filter, sort, self.page_size).await?;
        summary.total_count = pages.total_count();

        loop {
            // a drained iterator finishes normally even if shutdown arrived meanwhile
            if !pages.is_done() && self.shutdown_requested() {
                tracing::warn!(
                    pages = summary.pages,
                    written = summary.records_written,
                    "Shutdown requested, stopping export"
                );
                summary.interrupted = true;
                break;
            }

            let Some(mut batch) = pages.next_page().await? else {
                break;
            };
            summary.pages += 1;
            log_page_processing!(summary.pages, batch.len(), summary.total_count);

            self.resolver
                .resolve(&mut batch, config, &self.context.account)
                .await?;
            session.process_page(&mut sink, &batch, &mut summary)?;
        }

        if !summary.interrupted {
            session.finish(&mut sink, &mut summary)?;
        }

        let document = sink.finalize()?;

        let summary = summary.with_duration(start_time.elapsed());
        log_export_complete!(summary.records_written, summary.duration);
        summary.log_summary();

        Ok(ExportOutcome { document, summary })
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }
}
