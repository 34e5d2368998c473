//! Export definitions and column configuration
//!
//! - [`model`] - the typed [`ExportConfig`] and its [`ColumnSpec`]s
//! - [`xml`] - parsing of stored XML definitions
//! - [`loader`] - resolution of the definition an export runs with

pub mod loader;
pub mod model;
pub mod xml;

pub use loader::{ColumnConfigLoader, ExportOptions};
pub use model::{
    ColumnSource, ColumnSpec, ExportConfig, MappingEntry, DEFAULT_DATETIME_FORMAT,
    DEFAULT_EXPORT_NAME,
};
pub use xml::Definition;
