//! CSV writer for flattened review tables.

use std::io::Write;

use crate::api::ExplorerError;

use super::flatten::FlatTable;

/// Writes `table` as CSV, header first.
///
/// An empty table produces no output.
///
/// # Errors
///
/// Returns [`ExplorerError::Io`] if writing to the output fails.
pub fn write_csv<W: Write>(writer: W, table: &FlatTable) -> Result<(), ExplorerError> {
    if table.columns.is_empty() {
        return Ok(());
    }
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&table.columns).map_err(|error| csv_error(&error))?;
    for row in &table.rows {
        csv_writer.write_record(row).map_err(|error| csv_error(&error))?;
    }
    csv_writer
        .flush()
        .map_err(|error| ExplorerError::io("failed to flush CSV output", &error))
}

fn csv_error(error: &csv::Error) -> ExplorerError {
    ExplorerError::Io {
        message: format!("CSV write failed: {error}"),
    }
}
