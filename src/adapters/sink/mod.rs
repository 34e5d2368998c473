//! Row sinks
//!
//! A [`RowSink`] turns the stream of row events produced by an export into a
//! concrete document. The pipeline guarantees the event grammar
//!
//! ```text
//! (start_row (write_value | set_value)* end_row)* finalize
//! ```
//!
//! `write_value` calls keep their order within a row; `set_value` places a
//! named cell and carries no ordering.
//!
//! - [`CsvSink`] - CSV text via the `csv` crate
//! - [`TableSink`] - an in-memory [`Table`]

pub mod csv;
pub mod table;

pub use self::csv::CsvSink;
pub use self::table::{Table, TableRow, TableSink};

use crate::domain::Result;

/// Consumer of row events
pub trait RowSink: Send {
    /// Finished document returned by [`RowSink::finalize`]
    type Document;

    /// Opens a row
    fn start_row(&mut self) -> Result<()>;

    /// Appends one positional cell to the open row
    fn write_value(&mut self, value: &str) -> Result<()>;

    /// Places one named cell in the open row
    fn set_value(&mut self, key: &str, value: &str) -> Result<()>;

    /// Closes the open row
    fn end_row(&mut self) -> Result<()>;

    /// Completes the document; called once, after the last row
    fn finalize(self) -> Result<Self::Document>;
}
