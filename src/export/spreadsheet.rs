//! Spreadsheet serialization.

use super::{ExportResult, RowSet};
use rust_xlsxwriter::Workbook;
use std::path::Path;

pub const SHEET_NAME: &str = "Scanned Items";

/// Column widths in characters, matching `RowSet::HEADER`.
const COLUMN_WIDTHS: [f64; 6] = [5.0, 20.0, 15.0, 12.0, 30.0, 18.0];

/// Build the workbook for a row set: one sheet, header on the first row,
/// the `#` column written as numbers.
///
pub fn build_workbook(row_set: &RowSet) -> ExportResult<Workbook> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, (title, width)) in RowSet::HEADER.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        sheet.write_string(0, col, *title)?;
        sheet.set_column_width(col, width)?;
    }

    for (offset, row) in row_set.rows.iter().enumerate() {
        let line = offset as u32 + 1;
        sheet.write_number(line, 0, row.index as f64)?;
        for (col, cell) in row.cells().iter().enumerate().skip(1) {
            sheet.write_string(line, col as u16, cell.as_str())?;
        }
    }

    Ok(workbook)
}

/// Write the workbook for a row set to `path`.
///
pub fn write_workbook(row_set: &RowSet, path: &Path) -> ExportResult<()> {
    let mut workbook = build_workbook(row_set)?;
    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::Row;

    #[test]
    fn test_write_workbook_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Audit_2024-01-01.xlsx");
        let rows = RowSet {
            rows: vec![Row {
                index: 1,
                code: "ABC123".to_string(),
                location: "Shelf A-1".to_string(),
                condition: "Good".to_string(),
                notes: String::new(),
                scanned_time: "1/1/2024, 10:00:00 AM".to_string(),
            }],
        };

        write_workbook(&rows, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        // xlsx files are zip archives
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_build_workbook_names_sheet() {
        let mut workbook = build_workbook(&RowSet { rows: vec![] }).unwrap();
        let sheet = workbook.worksheet_from_index(0).unwrap();
        assert_eq!(sheet.name(), SHEET_NAME);
    }
}
