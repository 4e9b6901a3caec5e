//! Domain models for the commission pipeline.
//!
//! - [`Cell`] - a single spreadsheet value
//! - [`Table`] - named columns over rows of cells, the unit every stage
//!   consumes and produces

use std::fmt;

// =============================================================================
// Cell
// =============================================================================

/// One spreadsheet value. `Empty` plays the role of null.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel serial date (days since 1899-12-30, fraction = time of day).
    Date(f64),
}

impl Cell {
    /// Text cell, or `Empty` for an empty string.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// String form of a cell. Whole numbers print without a fractional part.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(n) | Cell::Date(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Cell::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

// =============================================================================
// Table
// =============================================================================

/// Column-named rows. Every row holds exactly one cell per header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Build a table from rows, padding or truncating each to the header width.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut table = Self::new(headers);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by exact header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at `(row, column name)`.
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let col = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[col]).collect())
    }

    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.headers.len(), Cell::Empty);
        self.rows.push(row);
    }

    /// Replace the values of an existing column, or append a new one.
    ///
    /// `values` must hold one cell per row.
    pub fn set_column(&mut self, name: &str, values: Vec<Cell>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(col) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[col] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Rewrite every cell of a column in place. Returns `false` if the column is absent.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> bool
    where
        F: FnMut(&Cell) -> Cell,
    {
        let Some(col) = self.column_index(name) else {
            return false;
        };
        for row in &mut self.rows {
            row[col] = f(&row[col]);
        }
        true
    }

    /// Remove the named columns; names not present are ignored.
    pub fn drop_columns(&mut self, names: &[&str]) {
        let keep: Vec<bool> = self
            .headers
            .iter()
            .map(|h| !names.contains(&h.as_str()))
            .collect();

        self.headers = retain_flagged(std::mem::take(&mut self.headers), &keep);
        for row in &mut self.rows {
            *row = retain_flagged(std::mem::take(row), &keep);
        }
    }

    /// Keep only rows for which `predicate` holds, preserving order.
    pub fn retain_rows<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&[Cell]) -> bool,
    {
        self.rows.retain(|row| predicate(row));
    }
}

fn retain_flagged<T>(items: Vec<T>, keep: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, keep)| keep.then_some(item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                vec![Cell::text("x"), Cell::Number(1.0), Cell::Bool(true)],
                vec![Cell::text("y"), Cell::Number(2.5)],
            ],
        )
    }

    #[test]
    fn test_rows_padded_to_header_width() {
        let table = sample();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1, "c"), Some(&Cell::Empty));
    }

    #[test]
    fn test_set_column_appends_and_replaces() {
        let mut table = sample();
        table.set_column("d", vec![Cell::Number(9.0), Cell::Empty]);
        assert_eq!(table.headers().last().map(String::as_str), Some("d"));
        assert_eq!(table.get(0, "d"), Some(&Cell::Number(9.0)));

        table.set_column("a", vec![Cell::text("X"), Cell::text("Y")]);
        assert_eq!(table.headers().len(), 4);
        assert_eq!(table.get(1, "a"), Some(&Cell::text("Y")));
    }

    #[test]
    fn test_drop_columns_keeps_order() {
        let mut table = sample();
        table.drop_columns(&["b", "missing"]);
        assert_eq!(table.headers(), &["a".to_string(), "c".to_string()]);
        assert_eq!(table.rows()[0], vec![Cell::text("x"), Cell::Bool(true)]);
    }

    #[test]
    fn test_retain_rows() {
        let mut table = sample();
        let b = table.column_index("b").unwrap();
        table.retain_rows(|row| row[b].as_number().is_some_and(|n| n > 2.0));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "a"), Some(&Cell::text("y")));
    }

    #[test]
    fn test_map_column_missing() {
        let mut table = sample();
        assert!(!table.map_column("zzz", |c| c.clone()));
        assert!(table.map_column("a", |_| Cell::Empty));
        assert!(table.column("a").unwrap().iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_display_whole_numbers() {
        assert_eq!(Cell::Number(12345678000190.0).to_string(), "12345678000190");
        assert_eq!(Cell::Number(2.5).to_string(), "2.5");
        assert_eq!(Cell::Empty.to_string(), "");
        assert_eq!(Cell::text("").to_string(), "");
    }
}
