//! Generic header row

use crate::adapters::sink::RowSink;
use crate::definition::ExportConfig;
use crate::domain::{ModelSchema, Result};

/// Writes the generic header row
///
/// With columns, each column contributes its header, else its record
/// property, else an empty cell. Without columns the model's field names are
/// written in schema order.
pub fn write_generic_header<S: RowSink>(
    sink: &mut S,
    config: &ExportConfig,
    schema: &ModelSchema,
) -> Result<()> {
    tracing::debug!(columns = config.columns.len(), "Writing generic header");

    sink.start_row()?;
    if config.has_columns() {
        for column in &config.columns {
            sink.write_value(column.header_label())?;
        }
    } else {
        for field in &schema.fields {
            sink.write_value(field)?;
        }
    }
    sink.end_row()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sink::TableSink;
    use crate::definition::ColumnSpec;
    use crate::domain::ModelName;

    fn schema() -> ModelSchema {
        ModelSchema::new(
            ModelName::new("Addressbook_Model_Contact").unwrap(),
            ["id", "n_fn", "email"],
        )
    }

    #[test]
    fn test_header_from_columns() {
        let config = ExportConfig::new("x").with_columns(vec![
            ColumnSpec::property("Name", "n_fn"),
            ColumnSpec::new("email").with_record_property("email"),
            ColumnSpec::new("computed").with_template("{{ record.n_fn }}"),
        ]);
        let mut sink = TableSink::new();
        write_generic_header(&mut sink, &config, &schema()).unwrap();

        let table = sink.finalize().unwrap();
        assert_eq!(table.cells(), vec![vec!["Name", "email", ""]]);
    }

    #[test]
    fn test_header_from_schema_without_columns() {
        let mut sink = TableSink::new();
        write_generic_header(&mut sink, &ExportConfig::default(), &schema()).unwrap();

        let table = sink.finalize().unwrap();
        assert_eq!(table.cells(), vec![vec!["id", "n_fn", "email"]]);
    }
}
