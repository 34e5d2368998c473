//! In-memory table sink

use super::RowSink;
use crate::domain::{Result, TabulaError};
use serde::Serialize;
use std::collections::BTreeMap;

/// One row of a [`Table`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableRow {
    /// Positional cells in write order
    pub cells: Vec<String>,
    /// Named cells placed with `set_value`
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub named: BTreeMap<String, String>,
}

/// Document produced by [`TableSink`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Rows in write order, header row included
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if no row was written
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Positional cells of every row
    pub fn cells(&self) -> Vec<Vec<String>> {
        self.rows.iter().map(|r| r.cells.clone()).collect()
    }
}

/// Sink collecting rows into a [`Table`]
///
/// Rejects events outside the row grammar, which makes it useful for
/// checking the pipeline as well as for embedding.
#[derive(Debug, Default)]
pub struct TableSink {
    table: Table,
    open: Option<TableRow>,
}

impl TableSink {
    /// Creates an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    fn open_row(&mut self, event: &str) -> Result<&mut TableRow> {
        self.open
            .as_mut()
            .ok_or_else(|| TabulaError::Sink(format!("{event} called outside of a row")))
    }
}

impl RowSink for TableSink {
    type Document = Table;

    fn start_row(&mut self) -> Result<()> {
        if self.open.is_some() {
            return Err(TabulaError::Sink("start_row called inside an open row".to_string()));
        }
        self.open = Some(TableRow::default());
        Ok(())
    }

    fn write_value(&mut self, value: &str) -> Result<()> {
        self.open_row("write_value")?.cells.push(value.to_string());
        Ok(())
    }

    fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        self.open_row("set_value")?
            .named
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn end_row(&mut self) -> Result<()> {
        let row = self
            .open
            .take()
            .ok_or_else(|| TabulaError::Sink("end_row called without start_row".to_string()))?;
        self.table.rows.push(row);
        Ok(())
    }

    fn finalize(self) -> Result<Table> {
        if self.open.is_some() {
            return Err(TabulaError::Sink("finalize called inside an open row".to_string()));
        }
        Ok(self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_rows() {
        let mut sink = TableSink::new();
        sink.start_row().unwrap();
        sink.write_value("a").unwrap();
        sink.write_value("b").unwrap();
        sink.end_row().unwrap();
        sink.start_row().unwrap();
        sink.set_value("city", "Hamburg").unwrap();
        sink.end_row().unwrap();

        let table = sink.finalize().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].cells, vec!["a", "b"]);
        assert_eq!(table.rows[1].named.get("city").map(String::as_str), Some("Hamburg"));
    }

    #[test]
    fn test_rejects_events_outside_rows() {
        let mut sink = TableSink::new();
        assert!(sink.write_value("x").is_err());
        assert!(sink.end_row().is_err());

        sink.start_row().unwrap();
        assert!(sink.start_row().is_err());
        assert!(sink.finalize().is_err());
    }
}
