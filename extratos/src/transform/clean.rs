//! Stage 1: derive the reseller name and normalize join keys.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Config;
use crate::error::{StageError, StageResult};
use crate::models::{Cell, Table};

/// First parenthesized substring, non-greedy.
static PARENTHESIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((.*?)\)").expect("valid reseller pattern"));

/// Trimmed text inside the first pair of parentheses of a client name.
///
/// `"Loja X (ACME)"` → `Some("ACME")`, `"Loja X"` → `None`.
pub fn extract_reseller_name(client_name: &str) -> Option<String> {
    PARENTHESIZED
        .captures(client_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Left-pad a client identifier with zeros to `width` characters.
///
/// Identifiers already `width` characters or longer are returned unchanged.
pub fn normalize_client_id(raw: &str, width: usize) -> String {
    let raw = raw.trim();
    let len = raw.chars().count();
    if len >= width {
        return raw.to_string();
    }
    format!("{}{}", "0".repeat(width - len), raw)
}

/// Uppercase and trim a join key. Empty results become `Cell::Empty`.
pub fn normalize_key(cell: &Cell) -> Cell {
    match cell {
        Cell::Empty => Cell::Empty,
        other => Cell::text(other.to_string().trim().to_uppercase()),
    }
}

/// Add the reseller column, pad client ids and normalize both join keys.
pub fn clean_tables(
    receivables: &mut Table,
    commissions: &mut Table,
    config: &Config,
) -> StageResult<()> {
    let columns = &config.columns;

    let names = receivables
        .column(&columns.client_name)
        .ok_or_else(|| StageError::MissingColumn(columns.client_name.clone()))?;
    let resellers: Vec<Cell> = names
        .into_iter()
        .map(|name| match extract_reseller_name(&name.to_string()) {
            Some(reseller) => normalize_key(&Cell::Text(reseller)),
            None => Cell::Empty,
        })
        .collect();
    receivables.set_column(&columns.reseller_name, resellers);

    let width = config.client_id_width;
    let padded = receivables.map_column(&columns.client_id, |cell| match cell {
        Cell::Empty => Cell::Empty,
        other => Cell::Text(normalize_client_id(&other.to_string(), width)),
    });
    if !padded {
        return Err(StageError::MissingColumn(columns.client_id.clone()));
    }

    if !commissions.map_column(&columns.resellers, normalize_key) {
        return Err(StageError::MissingColumn(columns.resellers.clone()));
    }

    Ok(())
}
