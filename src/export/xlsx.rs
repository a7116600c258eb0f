//! Excel workbook writer for flattened review tables.

use std::io::Write;

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::api::ExplorerError;

use super::flatten::FlatTable;

/// Name of the single worksheet holding the exported rows.
pub const SHEET_NAME: &str = "reviews";

/// Writes `table` as an `.xlsx` workbook with a bold header row.
///
/// Every cell is written as text so that values keep the same rendering
/// they have in the CSV export.
///
/// # Errors
///
/// Returns [`ExplorerError::Io`] if the workbook cannot be assembled or
/// writing to the output fails.
pub fn write_xlsx<W: Write>(writer: &mut W, table: &FlatTable) -> Result<(), ExplorerError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(|error| xlsx_error(&error))?;

    for (col, name) in table.columns.iter().enumerate() {
        sheet
            .write_string_with_format(0, column_index(col)?, name, &header)
            .map_err(|error| xlsx_error(&error))?;
    }
    for (row_offset, row) in table.rows.iter().enumerate() {
        let row_number = row_index(row_offset)?;
        for (col, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            sheet
                .write_string(row_number, column_index(col)?, value)
                .map_err(|error| xlsx_error(&error))?;
        }
    }

    let bytes = workbook.save_to_buffer().map_err(|error| xlsx_error(&error))?;
    writer
        .write_all(&bytes)
        .map_err(|error| ExplorerError::io("failed to write Excel output", &error))
}

fn row_index(offset: usize) -> Result<u32, ExplorerError> {
    offset
        .checked_add(1)
        .and_then(|row| u32::try_from(row).ok())
        .ok_or_else(|| too_large("rows"))
}

fn column_index(col: usize) -> Result<u16, ExplorerError> {
    u16::try_from(col).map_err(|_| too_large("columns"))
}

fn too_large(what: &str) -> ExplorerError {
    ExplorerError::Io {
        message: format!("too many {what} for an Excel worksheet"),
    }
}

fn xlsx_error(error: &XlsxError) -> ExplorerError {
    ExplorerError::Io {
        message: format!("Excel write failed: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
    use rstest::rstest;

    use super::*;

    fn read_back(table: &FlatTable) -> Vec<Vec<String>> {
        let mut buffer = Vec::new();
        write_xlsx(&mut buffer, table).expect("should write workbook");
        let mut workbook: Xlsx<_> =
            open_workbook_from_rs(Cursor::new(buffer)).expect("should open workbook");
        let range = workbook
            .worksheet_range(SHEET_NAME)
            .expect("reviews sheet should exist");
        range
            .rows()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Data::Empty => String::new(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .collect()
    }

    #[rstest]
    fn header_row_matches_table_columns() {
        let table = FlatTable {
            columns: vec!["guid".to_owned(), "rating".to_owned(), "verbatim_content".to_owned()],
            rows: vec![vec!["a".to_owned(), "5".to_owned(), "soft, rich".to_owned()]],
        };

        let rows = read_back(&table);

        assert_eq!(rows.first(), Some(&table.columns));
        assert_eq!(rows.get(1), table.rows.first());
    }

    #[rstest]
    fn empty_values_leave_blank_cells() {
        let table = FlatTable {
            columns: vec!["guid".to_owned(), "rating".to_owned()],
            rows: vec![
                vec!["a".to_owned(), String::new()],
                vec!["b".to_owned(), "4".to_owned()],
            ],
        };

        let rows = read_back(&table);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows.get(1), Some(&vec!["a".to_owned(), String::new()]));
        assert_eq!(rows.get(2), Some(&vec!["b".to_owned(), "4".to_owned()]));
    }
}
