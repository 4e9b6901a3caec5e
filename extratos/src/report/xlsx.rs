//! XLSX export of a [`Table`].

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::fs;
use std::path::Path;

use crate::error::{SaveError, SaveResult};
use crate::models::{Cell, Table};

const DATE_FORMAT: &str = "dd/mm/yyyy";

/// Create `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> SaveResult<()> {
    fs::create_dir_all(dir).map_err(|source| SaveError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write `table` to `path` as a single-sheet workbook: bold header row,
/// then one spreadsheet row per table row.
pub fn write_table(path: &Path, table: &Table) -> SaveResult<()> {
    let write_err = |e: rust_xlsxwriter::XlsxError| SaveError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let header_format = Format::new().set_bold();
    for (col, header) in table.headers().iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, header, &header_format)
            .map_err(write_err)?;
    }

    let date_format = Format::new().set_num_format(DATE_FORMAT);
    for (row_idx, row) in table.rows().iter().enumerate() {
        let row32 = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            write_cell(worksheet, row32, col as u16, cell, &date_format).map_err(write_err)?;
        }
    }

    workbook.save(path).map_err(write_err)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    date_format: &Format,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    match cell {
        Cell::Empty => {}
        Cell::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        Cell::Number(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        Cell::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Cell::Date(serial) => {
            worksheet.write_number_with_format(row, col, *serial, date_format)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::load_file;
    use tempfile::tempdir;

    #[test]
    fn test_write_then_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.xlsx");
        let table = Table::from_rows(
            vec!["Nome".into(), "Valor".into(), "Pago".into()],
            vec![
                vec![Cell::text("ACME"), Cell::Number(20.5), Cell::Bool(true)],
                vec![Cell::text("TOTAL"), Cell::Number(20.5)],
            ],
        );

        write_table(&path, &table).unwrap();
        let loaded = load_file(&path, None).unwrap();

        assert_eq!(loaded.headers(), table.headers());
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get(0, "Valor"), Some(&Cell::Number(20.5)));
        assert_eq!(loaded.get(0, "Pago"), Some(&Cell::Bool(true)));
        assert_eq!(loaded.get(1, "Pago"), Some(&Cell::Empty));
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("table.xlsx");
        let table = Table::new(vec!["A".into()]);

        let err = write_table(&path, &table).unwrap_err();
        assert!(matches!(err, SaveError::Write { .. }));
    }

    #[test]
    fn test_ensure_dir_nested() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
