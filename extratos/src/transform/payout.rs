//! Stage 3: compute the payout per installment and keep rows with a seller.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::config::Config;
use crate::error::{StageError, StageResult};
use crate::models::{Cell, Table};

/// Row counts of the seller filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayoutStats {
    pub kept: usize,
    pub without_seller: usize,
    pub marked_no_seller: usize,
    /// Kept rows whose amount or rate was missing.
    pub missing_payout: usize,
}

/// Exact decimal value of an `f64` as it prints (`0.1` → `0.1`, not the
/// binary expansion).
pub fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string()).ok()
}

/// `amount * rate`, truncated toward zero at two decimal places.
pub fn truncated_payout(amount: Decimal, rate: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(rate)
        .map(|p| p.round_dp_with_strategy(2, RoundingStrategy::ToZero))
}

/// Whether a cell can be a payout operand: a number, or empty.
pub fn is_numeric_operand(cell: &Cell) -> bool {
    matches!(cell, Cell::Empty | Cell::Number(_))
}

/// Payout cell for one row; `Empty` when either operand is not a number.
pub fn payout_cell(amount: &Cell, rate: &Cell) -> Cell {
    let payout = amount
        .as_number()
        .and_then(to_decimal)
        .zip(rate.as_number().and_then(to_decimal))
        .and_then(|(amount, rate)| truncated_payout(amount, rate))
        .and_then(|p| p.to_f64());

    match payout {
        Some(p) => Cell::Number(p),
        None => Cell::Empty,
    }
}

/// Whether a seller cell names a real seller.
pub fn is_valid_seller(seller: &Cell, no_seller_marker: &str) -> bool {
    match seller {
        Cell::Empty => false,
        other => other.to_string() != no_seller_marker,
    }
}

/// Add the payout column, then drop rows with no seller or the
/// no-seller marker.
///
/// Empty amounts or rates give an empty payout. Any other non-numeric
/// operand fails the stage with [`StageError::InvalidNumber`].
pub fn calculate_payout(mut table: Table, config: &Config) -> StageResult<(Table, PayoutStats)> {
    let columns = &config.columns;
    let column = |name: &String| {
        table
            .column_index(name)
            .ok_or_else(|| StageError::MissingColumn(name.clone()))
    };
    let amount_col = column(&columns.received_amount)?;
    let rate_col = column(&columns.commission)?;
    let seller_col = column(&columns.sellers)?;

    let mut payouts = Vec::with_capacity(table.len());
    for (index, row) in table.rows().iter().enumerate() {
        for (col, name) in [(amount_col, &columns.received_amount), (rate_col, &columns.commission)] {
            if !is_numeric_operand(&row[col]) {
                return Err(StageError::InvalidNumber {
                    column: name.clone(),
                    row: index + 1,
                    value: row[col].to_string(),
                });
            }
        }
        payouts.push(payout_cell(&row[amount_col], &row[rate_col]));
    }
    table.set_column(&columns.payout, payouts);

    let mut stats = PayoutStats::default();
    let payout_col = table
        .column_index(&columns.payout)
        .ok_or_else(|| StageError::MissingColumn(columns.payout.clone()))?;
    let marker = config.no_seller_marker.as_str();
    table.retain_rows(|row| {
        let seller = &row[seller_col];
        if seller.is_empty() {
            stats.without_seller += 1;
            return false;
        }
        if !is_valid_seller(seller, marker) {
            stats.marked_no_seller += 1;
            return false;
        }
        stats.kept += 1;
        if row[payout_col].is_empty() {
            stats.missing_payout += 1;
        }
        true
    });

    Ok((table, stats))
}
