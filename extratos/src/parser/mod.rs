//! Spreadsheet loader.
//!
//! Reads the first worksheet of an xls/xlsx/xlsb/ods file into a [`Table`].
//! The first non-empty row is the header row; header names are stripped of
//! surrounding whitespace. Text cells holding comma-decimal numbers
//! (`"200,50"`) are read as numbers, except in identifier columns, which
//! keep their text as written.

use calamine::{open_workbook_auto, Data, Reader};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::{LoadError, LoadResult};
use crate::models::{Cell, Table};

/// Plain number with an optional comma decimal part.
static COMMA_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+(,\d+)?$").expect("valid decimal pattern"));

/// Parse `"1234,56"` style text. Returns `None` for anything else.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let text = text.trim();
    if !COMMA_DECIMAL.is_match(text) {
        return None;
    }
    text.replace(',', ".").parse().ok()
}

/// Convert one calamine value into a [`Cell`]. Text is kept verbatim.
pub fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::text(s.as_str()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Date(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::text(s.as_str()),
    }
}

/// Read comma-decimal text as a number; anything else is unchanged.
pub fn coerce_number(cell: Cell) -> Cell {
    match cell {
        Cell::Text(s) => match parse_decimal(&s) {
            Some(n) => Cell::Number(n),
            None => Cell::Text(s),
        },
        other => other,
    }
}

/// Load a spreadsheet, keeping only `columns` when given.
pub fn load_file(path: &Path, columns: Option<&[String]>) -> LoadResult<Table> {
    load_file_with(path, columns, &[])
}

/// Load a spreadsheet, keeping only `columns` when given. Cells under
/// `text_columns` are never converted to numbers.
///
/// Kept columns stay in file order. Fails with a distinct [`LoadError`]
/// for a missing file, a zero-byte file, an unreadable format, an empty
/// sheet or absent columns.
pub fn load_file_with(
    path: &Path,
    columns: Option<&[String]>,
    text_columns: &[String],
) -> LoadResult<Table> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.display().to_string()));
    }
    let metadata = fs::metadata(path).map_err(|e| LoadError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if metadata.len() == 0 {
        return Err(LoadError::Empty(path.to_path_buf()));
    }

    let mut workbook = open_workbook_auto(path).map_err(|e| classify(path, e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::Empty(path.to_path_buf()))?
        .map_err(|e| classify(path, e))?;

    let rows: Vec<Vec<Cell>> = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    table_from_rows(path, rows, columns, text_columns)
}

/// Build a table from raw rows: header detection, column selection,
/// blank-row removal and number conversion outside `text_columns`.
pub fn table_from_rows(
    path: &Path,
    rows: Vec<Vec<Cell>>,
    columns: Option<&[String]>,
    text_columns: &[String],
) -> LoadResult<Table> {
    let mut rows = rows
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.is_empty()));

    let header_row = rows.next().ok_or_else(|| LoadError::Empty(path.to_path_buf()))?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let selected: Vec<usize> = match columns {
        Some(wanted) => {
            let missing: Vec<String> = wanted
                .iter()
                .filter(|name| !headers.iter().any(|h| h == name.trim()))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(LoadError::MissingColumns {
                    path: path.to_path_buf(),
                    columns: missing,
                });
            }
            (0..headers.len())
                .filter(|&i| wanted.iter().any(|name| name.trim() == headers[i]))
                .collect()
        }
        None => (0..headers.len()).filter(|&i| !headers[i].is_empty()).collect(),
    };

    let numeric: Vec<bool> = selected
        .iter()
        .map(|&i| !text_columns.iter().any(|name| name.trim() == headers[i]))
        .collect();
    let table_headers = selected.iter().map(|&i| headers[i].clone()).collect();
    let mut table = Table::new(table_headers);
    for row in rows {
        let picked = selected
            .iter()
            .zip(&numeric)
            .map(|(&i, &numeric)| {
                let cell = row.get(i).cloned().unwrap_or_default();
                if numeric {
                    coerce_number(cell)
                } else {
                    cell
                }
            })
            .collect();
        table.push_row(picked);
    }

    Ok(table)
}

/// Load the receivables (column-restricted) and commissions tables.
pub fn load(config: &Config) -> LoadResult<(Table, Table)> {
    let receivables_path = config.receivables_path()?;
    let identifiers = config.columns.identifiers();
    let receivables = load_file_with(
        &receivables_path,
        Some(&config.columns.receivables()),
        &identifiers,
    )?;
    let commissions = load_file_with(&config.commissions_file, None, &identifiers)?;
    Ok((receivables, commissions))
}

/// Map calamine failures onto the loader taxonomy.
fn classify(path: &Path, err: calamine::Error) -> LoadError {
    match err {
        calamine::Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
            LoadError::NotFound(path.display().to_string())
        }
        calamine::Error::Io(e) => LoadError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
        other => LoadError::InvalidFormat {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    }
}
