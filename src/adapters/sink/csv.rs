//! CSV sink
//!
//! Positional cells are written in call order. Named cells from
//! `set_value` follow them, laid out by the sink's key order; keys the order
//! does not list come last, sorted by name.

use super::RowSink;
use crate::domain::{Result, TabulaError};
use std::collections::BTreeMap;
use std::io::Write;

/// Sink writing CSV records to `W`
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    key_order: Vec<String>,
    cells: Vec<String>,
    named: BTreeMap<String, String>,
    in_row: bool,
    rows: usize,
}

impl<W: Write> CsvSink<W> {
    /// Creates a sink with the given field delimiter
    pub fn new(inner: W, delimiter: u8) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_writer(inner);
        Self {
            writer,
            key_order: Vec::new(),
            cells: Vec::new(),
            named: BTreeMap::new(),
            in_row: false,
            rows: 0,
        }
    }

    /// Sets the column order of named cells
    pub fn with_key_order(mut self, keys: Vec<String>) -> Self {
        self.key_order = keys;
        self
    }

    /// Rows written so far
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    fn ensure_row(&self, event: &str) -> Result<()> {
        if self.in_row {
            Ok(())
        } else {
            Err(TabulaError::Sink(format!("{event} called outside of a row")))
        }
    }
}

impl<W: Write + Send> RowSink for CsvSink<W> {
    type Document = W;

    fn start_row(&mut self) -> Result<()> {
        if self.in_row {
            return Err(TabulaError::Sink("start_row called inside an open row".to_string()));
        }
        self.in_row = true;
        Ok(())
    }

    fn write_value(&mut self, value: &str) -> Result<()> {
        self.ensure_row("write_value")?;
        self.cells.push(value.to_string());
        Ok(())
    }

    fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        self.ensure_row("set_value")?;
        self.named.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn end_row(&mut self) -> Result<()> {
        self.ensure_row("end_row")?;

        let mut record = std::mem::take(&mut self.cells);
        let mut named = std::mem::take(&mut self.named);
        for key in &self.key_order {
            record.push(named.remove(key).unwrap_or_default());
        }
        record.extend(named.into_values());

        self.writer.write_record(&record)?;
        self.in_row = false;
        self.rows += 1;
        Ok(())
    }

    fn finalize(mut self) -> Result<W> {
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| TabulaError::Sink(format!("Failed to finish CSV output: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(sink: &mut CsvSink<Vec<u8>>, cells: &[&str]) {
        sink.start_row().unwrap();
        for cell in cells {
            sink.write_value(cell).unwrap();
        }
        sink.end_row().unwrap();
    }

    #[test]
    fn test_writes_quoted_csv() {
        let mut sink = CsvSink::new(Vec::new(), b',');
        row(&mut sink, &["Name", "Note"]);
        row(&mut sink, &["Alice", "likes \"tea\", coffee"]);
        assert_eq!(sink.rows_written(), 2);

        let out = String::from_utf8(sink.finalize().unwrap()).unwrap();
        assert_eq!(out, "Name,Note\nAlice,\"likes \"\"tea\"\", coffee\"\n");
    }

    #[test]
    fn test_named_cells_follow_key_order() {
        let mut sink = CsvSink::new(Vec::new(), b';')
            .with_key_order(vec!["city".to_string(), "name".to_string()]);
        sink.start_row().unwrap();
        sink.set_value("name", "Bob").unwrap();
        sink.set_value("zip", "20095").unwrap();
        sink.set_value("city", "Hamburg").unwrap();
        sink.end_row().unwrap();

        let out = String::from_utf8(sink.finalize().unwrap()).unwrap();
        assert_eq!(out, "Hamburg;Bob;20095\n");
    }

    #[test]
    fn test_value_outside_row_is_rejected() {
        let mut sink = CsvSink::new(Vec::new(), b',');
        assert!(matches!(sink.write_value("x"), Err(TabulaError::Sink(_))));
    }
}
