//! Export orchestration
//!
//! This module provides the core export logic for Tabula, including:
//! - Paged record iteration
//! - Session state and render mode selection
//! - Header and row processing
//! - Orchestration, summary and reporting

pub mod header;
pub mod iterator;
pub mod orchestrator;
pub mod row;
pub mod session;
pub mod summary;

pub use header::write_generic_header;
pub use iterator::RecordIterator;
pub use orchestrator::{ExportOrchestrator, ExportOutcome, DEFAULT_PAGE_SIZE};
pub use row::RowProcessor;
pub use session::{ExportContext, ExportSession, RenderMode};
pub use summary::ExportSummary;
