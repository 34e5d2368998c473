//! Core business logic for Tabula.
//!
//! This module contains the export pipeline itself.
//!
//! # Modules
//!
//! - [`export`] - Orchestration, sessions, header and row processing
//! - [`resolve`] - Batch resolution of user, note and container references
//! - [`template`] - Template engine adapter
//! - [`format`] - Value stringification
//!
//! # Export Workflow
//!
//! 1. **Load Definition**: resolve the export definition for the model
//! 2. **Select Mode**: dump, column template or full template
//! 3. **Iterate**: fetch matching records page by page
//! 4. **Resolve**: materialize references of each page
//! 5. **Write**: header on the first page, then one row per record
//! 6. **Finalize**: template footer pass, then the sink's document
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tabula::adapters::dataset::JsonDataset;
//! use tabula::adapters::sink::TableSink;
//! use tabula::core::export::{ExportContext, ExportOrchestrator};
//! use tabula::core::resolve::FieldResolver;
//! use tabula::core::template::MiniJinjaEngine;
//! use tabula::definition::{ColumnSpec, ExportConfig};
//! use tabula::domain::{Account, RecordFilter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dataset = Arc::new(JsonDataset::load("contacts.json".as_ref()).await?);
//! let resolver = FieldResolver::new(dataset.clone(), dataset.clone(), dataset.clone());
//! let context = ExportContext::new(Account::new("u1", "Alice"));
//! let orchestrator =
//!     ExportOrchestrator::new(dataset.clone(), resolver, Arc::new(MiniJinjaEngine::new()), context);
//!
//! let config = ExportConfig::new("default")
//!     .with_columns(vec![ColumnSpec::property("Name", "n_fn")]);
//! let filter = RecordFilter::all(dataset.model().clone());
//!
//! let outcome = orchestrator.generate(&filter, None, &config, TableSink::new()).await?;
//! println!("{} rows", outcome.document.len());
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod format;
pub mod resolve;
pub mod template;
