// Tabula - record-to-document export pipeline
// Copyright (c) 2025 Tabula Contributors
// Licensed under the MIT License

//! # Tabula - record-to-document export pipeline
//!
//! Tabula turns pages of business records into tabular documents. An XML
//! export definition names the columns to write; each column reads a record
//! property or a MiniJinja expression. Definitions may instead point at a
//! whole-document template whose JSON output is routed to named cells.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Export pipeline (orchestration, rows, resolution, templates)
//! - [`definition`] - Export definitions and the column configuration loader
//! - [`adapters`] - Collaborator traits and reference implementations
//! - [`domain`] - Records, identifiers, errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tabula::adapters::dataset::JsonDataset;
//! use tabula::adapters::definitions::FsDefinitionStore;
//! use tabula::adapters::sink::TableSink;
//! use tabula::core::export::{ExportContext, ExportOrchestrator};
//! use tabula::core::resolve::FieldResolver;
//! use tabula::core::template::MiniJinjaEngine;
//! use tabula::definition::{ColumnConfigLoader, ExportOptions};
//! use tabula::domain::{Account, ModelName, RecordFilter};
//!
//! # async fn example() -> tabula::domain::Result<()> {
//! let dataset = Arc::new(JsonDataset::load(std::path::Path::new("contacts.json")).await?);
//! let store = Arc::new(FsDefinitionStore::open("definitions").await?);
//!
//! let orchestrator = ExportOrchestrator::new(
//!     dataset.clone(),
//!     FieldResolver::new(dataset.clone(), dataset.clone(), dataset.clone()),
//!     Arc::new(MiniJinjaEngine::new()),
//!     ExportContext::new(Account::new("u1", "Alice")),
//! );
//!
//! let filter = RecordFilter::all(ModelName::new("Addressbook_Model_Contact").unwrap());
//! let outcome = orchestrator
//!     .export(
//!         &ColumnConfigLoader::new(store),
//!         &ExportOptions::default(),
//!         &filter,
//!         None,
//!         TableSink::new(),
//!     )
//!     .await?;
//!
//! println!("{} rows", outcome.document.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Structural failures are [`domain::TabulaError`]s and propagate with `?`.
//! Per-record problems (a template yielding the wrong JSON shape, a missing
//! mapped value, a column without a source) are [`domain::ExportIssue`]s:
//! logged, counted in the export summary and never fatal.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod definition;
pub mod domain;
pub mod logging;
