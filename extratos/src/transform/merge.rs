//! Stage 2: left-join receivables to commissions on the reseller name.

use std::collections::HashMap;

use crate::config::Config;
use crate::error::{StageError, StageResult};
use crate::logs::log_warning;
use crate::models::{Cell, Table};

/// Outcome counters of a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub matched: usize,
    pub unmatched: usize,
    /// Reseller names seen more than once in the commissions table.
    pub duplicate_keys: Vec<String>,
}

/// Left-join `receivables` to `commissions`.
///
/// Appends the reseller key, seller and commission columns (in that order).
/// Every receivable row is kept; unmatched rows get empty cells. Empty keys
/// never match. When a reseller appears more than once in `commissions`, the
/// first row in file order wins.
pub fn merge_tables(
    receivables: &Table,
    commissions: &Table,
    config: &Config,
) -> StageResult<(Table, MergeStats)> {
    let columns = &config.columns;
    let key_col = receivables
        .column_index(&columns.reseller_name)
        .ok_or_else(|| StageError::MissingColumn(columns.reseller_name.clone()))?;

    let pulled = [&columns.resellers, &columns.sellers, &columns.commission];
    let mut pulled_idx = Vec::with_capacity(pulled.len());
    for name in pulled {
        let idx = commissions
            .column_index(name)
            .ok_or_else(|| StageError::MissingColumn(name.clone()))?;
        pulled_idx.push(idx);
    }

    let mut stats = MergeStats::default();
    let lookup = index_first(commissions, pulled_idx[0], &mut stats);
    for key in &stats.duplicate_keys {
        log_warning(format!(
            "Reseller '{}' appears more than once in commissions, using the first row",
            key
        ));
    }

    let mut headers = receivables.headers().to_vec();
    headers.extend(pulled.iter().map(|name| name.to_string()));
    let mut merged = Table::new(headers);

    for row in receivables.rows() {
        let matched = match &row[key_col] {
            Cell::Empty => None,
            key => lookup.get(key.to_string().as_str()).copied(),
        };

        let mut out = row.clone();
        match matched {
            Some(commission_row) => {
                stats.matched += 1;
                let source = &commissions.rows()[commission_row];
                out.extend(pulled_idx.iter().map(|&i| source[i].clone()));
            }
            None => {
                stats.unmatched += 1;
                out.extend(std::iter::repeat(Cell::Empty).take(pulled_idx.len()));
            }
        }
        merged.push_row(out);
    }

    Ok((merged, stats))
}

/// Map each non-empty key to the index of its first row.
fn index_first(table: &Table, key_col: usize, stats: &mut MergeStats) -> HashMap<String, usize> {
    let mut lookup = HashMap::new();
    for (i, row) in table.rows().iter().enumerate() {
        let key = &row[key_col];
        if key.is_empty() {
            continue;
        }
        let key = key.to_string();
        if lookup.contains_key(&key) {
            if !stats.duplicate_keys.contains(&key) {
                stats.duplicate_keys.push(key);
            }
        } else {
            lookup.insert(key, i);
        }
    }
    lookup
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receivables(config: &Config, keys: &[Option<&str>]) -> Table {
        let rows = keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                vec![
                    Cell::Number(i as f64),
                    key.map(Cell::text).unwrap_or_default(),
                ]
            })
            .collect();
        Table::from_rows(
            vec!["id".into(), config.columns.reseller_name.clone()],
            rows,
        )
    }

    fn commissions(config: &Config, rows: &[(&str, &str, f64)]) -> Table {
        let cols = &config.columns;
        Table::from_rows(
            vec![cols.resellers.clone(), cols.sellers.clone(), cols.commission.clone()],
            rows.iter()
                .map(|(r, s, c)| vec![Cell::text(*r), Cell::text(*s), Cell::Number(*c)])
                .collect(),
        )
    }

    #[test]
    fn test_left_join_preserves_rows() {
        let config = Config::default();
        let left = receivables(&config, &[Some("ACME"), Some("NONE"), None, Some("ACME")]);
        let right = commissions(&config, &[("ACME", "SELLER1", 0.1), ("BETA", "SELLER2", 0.2)]);

        let (merged, stats) = merge_tables(&left, &right, &config).unwrap();

        assert_eq!(merged.len(), left.len());
        assert_eq!(stats.matched, 2);
        assert_eq!(stats.unmatched, 2);
        assert_eq!(merged.headers().len(), 5);
        assert_eq!(merged.get(0, "SELLERS"), Some(&Cell::text("SELLER1")));
        assert_eq!(merged.get(0, "COMISSÃO"), Some(&Cell::Number(0.1)));
        assert_eq!(merged.get(1, "SELLERS"), Some(&Cell::Empty));
        assert_eq!(merged.get(2, "RESSELLERS"), Some(&Cell::Empty));
        assert_eq!(merged.get(3, "RESSELLERS"), Some(&Cell::text("ACME")));
    }

    #[test]
    fn test_duplicate_reseller_uses_first_row() {
        let config = Config::default();
        let left = receivables(&config, &[Some("ACME")]);
        let right = commissions(
            &config,
            &[("ACME", "FIRST", 0.1), ("ACME", "SECOND", 0.5), ("ACME", "THIRD", 0.9)],
        );

        let (merged, stats) = merge_tables(&left, &right, &config).unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get(0, "SELLERS"), Some(&Cell::text("FIRST")));
        assert_eq!(stats.duplicate_keys, vec!["ACME".to_string()]);
    }

    #[test]
    fn test_empty_keys_never_match() {
        let config = Config::default();
        let left = receivables(&config, &[None]);
        let mut right = commissions(&config, &[("X", "SELLER1", 0.1)]);
        right.push_row(vec![Cell::Empty, Cell::text("NULL SELLER"), Cell::Number(0.3)]);

        let (merged, _) = merge_tables(&left, &right, &config).unwrap();
        assert_eq!(merged.get(0, "SELLERS"), Some(&Cell::Empty));
    }

    #[test]
    fn test_missing_commission_column() {
        let config = Config::default();
        let left = receivables(&config, &[Some("ACME")]);
        let right = Table::new(vec!["RESSELLERS".into(), "SELLERS".into()]);

        let err = merge_tables(&left, &right, &config).unwrap_err();
        assert!(matches!(err, StageError::MissingColumn(ref c) if c == "COMISSÃO"));
    }
}
