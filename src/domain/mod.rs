//! Domain models and types for Tabula.
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ModelName`], [`DefinitionId`])
//! - **Queries** ([`RecordFilter`], [`SortSpec`])
//! - **Records** ([`Record`], [`RecordBatch`], [`FieldValue`], [`ModelSchema`])
//! - **Export context** ([`Account`], [`Branding`])
//! - **Error types** ([`TabulaError`], [`ExportIssue`]) and the [`Result`] alias
//!
//! # Example
//!
//! ```rust
//! use tabula::domain::{FieldValue, Record, RecordBatch};
//!
//! let batch = RecordBatch::new(vec![
//!     Record::new("1").with("name", "Alice"),
//!     Record::new("2").with("name", "Bob"),
//! ]);
//! assert_eq!(batch.len(), 2);
//! assert_eq!(batch.iter().next().unwrap().get("name"), &FieldValue::from("Alice"));
//! ```

pub mod account;
pub mod context;
pub mod errors;
pub mod ids;
pub mod query;
pub mod record;
pub mod result;

pub use account::{parse_locale, parse_utc_offset, Account, AccountTimezone, Branding};
pub use errors::{ExportIssue, TabulaError};
pub use ids::{DefinitionId, ModelName};
pub use query::{FilterCondition, FilterOperator, RecordFilter, SortDirection, SortSpec};
pub use record::{ContainerRef, FieldValue, ModelSchema, Note, Record, RecordBatch, UserRef};
pub use result::Result;
