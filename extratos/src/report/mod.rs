//! Per-seller statements.
//!
//! Takes the final table, drops the join helper columns, groups rows by
//! seller and writes one `<seller>.xlsx` per group, each ending with a
//! TOTAL row.
//!
//! ```text
//! final table                          output/
//! ┌──────────────────────────┐        ┌──────────────────────────┐
//! │ ... SELLER1  20.00       │        │ SELLER1.xlsx             │
//! │ ... SELLER2   7.50       │   →    │   ... 20.00              │
//! │ ... SELLER1   5.00       │        │   ...  5.00              │
//! └──────────────────────────┘        │   TOTAL 25.00            │
//!                                     ├──────────────────────────┤
//!                                     │ SELLER2.xlsx             │
//!                                     └──────────────────────────┘
//! ```

pub mod xlsx;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::config::Config;
use crate::error::{SaveError, SaveResult};
use crate::logs::{log_info, log_success_indent};
use crate::models::{Cell, Table};
use crate::transform::payout::to_decimal;

pub use xlsx::{ensure_dir, write_table};

/// One written statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SellerStatement {
    pub seller: String,
    pub path: PathBuf,
    /// Data rows, excluding the TOTAL row.
    pub rows: usize,
    pub total: f64,
}

/// Result of a save run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveSummary {
    pub statements: Vec<SellerStatement>,
}

impl SaveSummary {
    pub fn files_written(&self) -> usize {
        self.statements.len()
    }
}

/// Split `table` into one table per seller, sorted by seller name.
/// Row order inside each group follows the input.
pub fn group_by_seller(table: &Table, seller_column: &str) -> SaveResult<BTreeMap<String, Table>> {
    let seller_col = table
        .column_index(seller_column)
        .ok_or_else(|| SaveError::MissingColumn(seller_column.to_string()))?;

    let mut groups: BTreeMap<String, Table> = BTreeMap::new();
    for row in table.rows() {
        let seller = &row[seller_col];
        if seller.is_empty() {
            continue;
        }
        groups
            .entry(seller.to_string())
            .or_insert_with(|| Table::new(table.headers().to_vec()))
            .push_row(row.clone());
    }
    Ok(groups)
}

/// Sum of the payout column; empty cells count as zero.
pub fn payout_total(group: &Table, payout_column: &str) -> Decimal {
    group
        .column(payout_column)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|cell| cell.as_number().and_then(to_decimal))
        .sum()
}

/// Append the TOTAL row: label in the first column, total under the payout.
pub fn append_total_row(group: &mut Table, label: &str, payout_column: &str, total: f64) {
    let mut row = vec![Cell::Empty; group.headers().len()];
    if let Some(first) = row.first_mut() {
        *first = Cell::text(label);
    }
    if let Some(col) = group.column_index(payout_column) {
        row[col] = Cell::Number(total);
    }
    group.push_row(row);
}

/// File name for a seller's statement. Path separators become `_`.
pub fn statement_file_name(seller: &str) -> String {
    let safe: String = seller
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{}.xlsx", safe)
}

/// File name for every seller, in seller order. Fails when two sellers
/// would share a file.
pub fn statement_file_names<'a>(
    sellers: impl IntoIterator<Item = &'a String>,
) -> SaveResult<Vec<String>> {
    let mut used: HashMap<String, &String> = HashMap::new();
    let mut names = Vec::new();
    for seller in sellers {
        let file_name = statement_file_name(seller);
        if let Some(first) = used.get(&file_name) {
            return Err(SaveError::NameCollision {
                file: file_name,
                first: first.to_string(),
                second: seller.clone(),
            });
        }
        used.insert(file_name.clone(), seller);
        names.push(file_name);
    }
    Ok(names)
}

/// Write one statement per seller into `config.output_dir`.
///
/// File names are checked for collisions before anything is written.
pub fn save(mut table: Table, config: &Config) -> SaveResult<SaveSummary> {
    let columns = &config.columns;

    table.drop_columns(&[columns.resellers.as_str(), columns.reseller_name.as_str()]);
    let groups = group_by_seller(&table, &columns.sellers)?;
    let file_names = statement_file_names(groups.keys())?;

    ensure_dir(&config.output_dir)?;

    let mut summary = SaveSummary::default();
    for ((seller, mut group), file_name) in groups.into_iter().zip(file_names) {
        log_info(format!("Processing statement for seller: '{}'", file_name));

        let rows = group.len();
        let total = payout_total(&group, &columns.payout).to_f64().unwrap_or_default();
        append_total_row(&mut group, &config.total_label, &columns.payout, total);

        let path = config.output_dir.join(&file_name);
        write_table(&path, &group)?;
        log_success_indent(format!("{} rows, total {:.2}", rows, total), 1);

        summary.statements.push(SellerStatement { seller, path, rows, total });
    }

    Ok(summary)
}
