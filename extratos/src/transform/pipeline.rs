//! End-to-end statement run: load → clean → merge → calculate → save.
//!
//! Each transform stage writes a numbered snapshot of its output into the
//! temp directory (when enabled), so a bad statement can be traced back to
//! the stage that produced it.
//!
//! # Example
//!
//! ```rust,ignore
//! use extratos::{run, Config};
//!
//! let config = Config::from_env()?;
//! let summary = run(&config)?;
//! println!("{} statements written", summary.save.files_written());
//! ```

use std::path::PathBuf;

use super::clean::clean_tables;
use super::merge::{merge_tables, MergeStats};
use super::payout::{calculate_payout, PayoutStats};
use crate::config::Config;
use crate::error::{PipelineResult, StageResult, TransformError, TransformResult};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::Table;
use crate::parser;
use crate::report::{self, ensure_dir, write_table, SaveSummary};

/// Snapshot written after the clean stage.
pub const CLEAN_SNAPSHOT: &str = "1-contas_a_receber_com_resselers.xlsx";
/// Snapshot written after the merge stage.
pub const MERGE_SNAPSHOT: &str = "2-contas_a_receber_reseller_comissoes.xlsx";
/// Snapshot written after the calculate stage.
pub const FINAL_SNAPSHOT: &str = "3-contas_a_receber_final.xlsx";

/// Counters collected by the transform stages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformSummary {
    pub merge: MergeStats,
    pub payout: PayoutStats,
    pub snapshots: Vec<PathBuf>,
}

/// Result of a full run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub receivable_rows: usize,
    pub commission_rows: usize,
    pub transform: TransformSummary,
    pub save: SaveSummary,
}

/// Run the whole pipeline with `config`.
///
/// Stops at the first failing stage; statements written before a save
/// failure stay on disk.
pub fn run(config: &Config) -> PipelineResult<RunSummary> {
    log_info("Loading spreadsheets...");
    let (receivables, commissions) = parser::load(config)?;
    log_success(format!(
        "Loaded {} receivables and {} commission rows",
        receivables.len(),
        commissions.len()
    ));

    let receivable_rows = receivables.len();
    let commission_rows = commissions.len();

    let (table, transform_summary) = transform(receivables, commissions, config)?;

    log_info("Saving seller statements...");
    let save = report::save(table, config)?;
    log_success(format!("{} statements written to {}", save.files_written(), config.output_dir.display()));

    Ok(RunSummary {
        receivable_rows,
        commission_rows,
        transform: transform_summary,
        save,
    })
}

/// Clean, merge and calculate. Failures are tagged with the stage they
/// happened in.
pub fn transform(
    mut receivables: Table,
    mut commissions: Table,
    config: &Config,
) -> TransformResult<(Table, TransformSummary)> {
    let mut summary = TransformSummary::default();

    log_info("Cleaning tables...");
    clean_tables(&mut receivables, &mut commissions, config)
        .and_then(|_| snapshot(&receivables, CLEAN_SNAPSHOT, config, &mut summary))
        .map_err(TransformError::Clean)?;

    log_info("Merging receivables with commissions...");
    let merged = merge_tables(&receivables, &commissions, config)
        .and_then(|(merged, stats)| {
            snapshot(&merged, MERGE_SNAPSHOT, config, &mut summary)?;
            Ok((merged, stats))
        })
        .map_err(TransformError::Merge)?;
    let (merged, merge_stats) = merged;
    log_info_indent(
        format!("{} matched, {} without reseller match", merge_stats.matched, merge_stats.unmatched),
        1,
    );
    summary.merge = merge_stats;

    log_info("Calculating payouts...");
    let (table, payout_stats) = calculate_payout(merged, config)
        .and_then(|(table, stats)| {
            snapshot(&table, FINAL_SNAPSHOT, config, &mut summary)?;
            Ok((table, stats))
        })
        .map_err(TransformError::Calculate)?;
    log_info_indent(
        format!(
            "{} rows kept, {} without seller, {} marked '{}'",
            payout_stats.kept,
            payout_stats.without_seller,
            payout_stats.marked_no_seller,
            config.no_seller_marker
        ),
        1,
    );
    if payout_stats.missing_payout > 0 {
        log_warning(format!(
            "{} rows have no received amount or commission rate; counted as 0 in totals",
            payout_stats.missing_payout
        ));
    }
    summary.payout = payout_stats;

    Ok((table, summary))
}

/// Write a stage snapshot into `config.temp_dir`.
fn snapshot(
    table: &Table,
    name: &str,
    config: &Config,
    summary: &mut TransformSummary,
) -> StageResult<()> {
    if !config.write_snapshots {
        return Ok(());
    }
    ensure_dir(&config.temp_dir)?;
    let path = config.temp_dir.join(name);
    write_table(&path, table)?;
    summary.snapshots.push(path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_auto, Data, Reader};
    use crate::error::{LoadError, PipelineError, StageError};
    use crate::models::Cell;
    use crate::parser::load_file;
    use crate::parser::tests::write_fixture;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const RECEIVABLES_HEADER: [&str; 7] = [
        "Identificador do cliente",
        "Nome do cliente",
        "Data de competência",
        "Data de vencimento",
        "Valor original da parcela (R$)",
        "Valor recebido da parcela (R$)",
        "Data do último pagamento",
    ];

    fn setup(dir: &Path, commissions: &[Vec<&str>]) -> Config {
        let mut config = Config::with_data_dir(dir);
        config.receivables_pattern = "*.xlsx".to_string();
        fs::create_dir_all(&config.input_dir).unwrap();

        let mut rows = vec![RECEIVABLES_HEADER.to_vec()];
        rows.push(vec!["#123", "Loja Centro (acme)", "01/01/2024", "10/01/2024", "#250", "#200", "09/01/2024"]);
        rows.push(vec!["#456", "Loja Norte ( ACME )", "01/01/2024", "10/02/2024", "#250", "#50", "08/02/2024"]);
        rows.push(vec!["#789", "Loja Sul (beta)", "01/01/2024", "10/01/2024", "#80", "#80", "10/01/2024"]);
        rows.push(vec!["#999", "Cliente direto", "01/01/2024", "10/01/2024", "#30", "#30", "10/01/2024"]);
        write_fixture(&config.input_dir.join("contas.xlsx"), &rows);

        write_fixture(&config.commissions_file, commissions);
        config
    }

    /// Cell as stored in the workbook, before any number conversion.
    fn raw_cell(path: &Path, row: usize, col: usize) -> Data {
        let mut workbook = open_workbook_auto(path).unwrap();
        let range = workbook.worksheet_range_at(0).unwrap().unwrap();
        range.get((row, col)).cloned().unwrap()
    }

    fn default_commissions() -> Vec<Vec<&'static str>> {
        vec![
            vec!["RESSELLERS", "SELLERS", "COMISSÃO"],
            vec!["Acme", "SELLER1", "#0.1"],
            vec!["BETA", "SEM SELLER", "#0.2"],
        ]
    }

    #[test]
    fn test_run_end_to_end() {
        let dir = tempdir().unwrap();
        let config = setup(dir.path(), &default_commissions());

        let summary = run(&config).unwrap();

        assert_eq!(summary.receivable_rows, 4);
        assert_eq!(summary.commission_rows, 2);
        assert_eq!(summary.transform.merge.matched, 3);
        assert_eq!(summary.transform.payout.kept, 2);
        assert_eq!(summary.transform.payout.marked_no_seller, 1);
        assert_eq!(summary.transform.payout.without_seller, 1);
        assert_eq!(summary.save.files_written(), 1);

        let written: Vec<_> = fs::read_dir(&config.output_dir).unwrap().flatten().collect();
        assert_eq!(written.len(), 1);

        let cols = &config.columns;
        let statement = load_file(&config.output_dir.join("SELLER1.xlsx"), None).unwrap();
        assert_eq!(statement.len(), 3);
        assert_eq!(
            raw_cell(&config.output_dir.join("SELLER1.xlsx"), 1, 0),
            Data::String("00000000000123".into())
        );
        assert_eq!(statement.get(0, &cols.payout), Some(&Cell::Number(20.0)));
        assert_eq!(statement.get(1, &cols.payout), Some(&Cell::Number(5.0)));
        assert_eq!(statement.get(2, &cols.client_id), Some(&Cell::text("TOTAL")));
        assert_eq!(statement.get(2, &cols.payout), Some(&Cell::Number(25.0)));
        assert!(!statement.has_column(&cols.resellers));
        assert!(!statement.has_column(&cols.reseller_name));
    }

    #[test]
    fn test_snapshots_written_per_stage() {
        let dir = tempdir().unwrap();
        let config = setup(dir.path(), &default_commissions());

        let summary = run(&config).unwrap();

        assert_eq!(summary.transform.snapshots.len(), 3);
        for name in [CLEAN_SNAPSHOT, MERGE_SNAPSHOT, FINAL_SNAPSHOT] {
            assert!(config.temp_dir.join(name).exists(), "{name} missing");
        }

        let cleaned = load_file(&config.temp_dir.join(CLEAN_SNAPSHOT), None).unwrap();
        assert_eq!(cleaned.len(), 4);
        assert_eq!(cleaned.get(1, &config.columns.reseller_name), Some(&Cell::text("ACME")));

        let last = load_file(&config.temp_dir.join(FINAL_SNAPSHOT), None).unwrap();
        assert_eq!(last.len(), 2);
    }

    #[test]
    fn test_snapshots_disabled() {
        let dir = tempdir().unwrap();
        let mut config = setup(dir.path(), &default_commissions());
        config.write_snapshots = false;

        let summary = run(&config).unwrap();

        assert!(summary.transform.snapshots.is_empty());
        assert!(!config.temp_dir.exists());
    }

    #[test]
    fn test_missing_commissions_is_load_error() {
        let dir = tempdir().unwrap();
        let config = setup(dir.path(), &default_commissions());
        fs::remove_file(&config.commissions_file).unwrap();

        let err = run(&config).unwrap_err();
        assert!(matches!(err, PipelineError::Load(LoadError::NotFound(_))));
        assert!(err.user_message().starts_with("Load error:"));
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn test_missing_receivables_is_load_error() {
        let dir = tempdir().unwrap();
        let mut config = setup(dir.path(), &default_commissions());
        config.receivables_pattern = "*.xls".to_string();

        let err = run(&config).unwrap_err();
        assert_eq!(err.stage(), "load");
    }

    #[test]
    fn test_missing_seller_column_fails_merge() {
        let dir = tempdir().unwrap();
        let commissions = vec![vec!["RESSELLERS", "COMISSÃO"], vec!["ACME", "#0.1"]];
        let config = setup(dir.path(), &commissions);

        let err = run(&config).unwrap_err();
        match err {
            PipelineError::Transform(TransformError::Merge(StageError::MissingColumn(ref c))) => {
                assert_eq!(c, "SELLERS")
            }
            ref other => panic!("unexpected error: {other}"),
        }
        assert!(err.user_message().starts_with("Transform error: Failed to merge tables"));
    }

    #[test]
    fn test_text_rate_fails_calculate_stage() {
        let dir = tempdir().unwrap();
        let commissions = vec![
            vec!["RESSELLERS", "SELLERS", "COMISSÃO"],
            vec!["ACME", "SELLER1", "10%"],
        ];
        let config = setup(dir.path(), &commissions);

        let err = run(&config).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Transform(TransformError::Calculate(StageError::InvalidNumber { .. }))
        ));
        assert!(err.user_message().contains("10%"));
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn test_snapshot_failure_is_stage_error() {
        let dir = tempdir().unwrap();
        let config = setup(dir.path(), &default_commissions());
        fs::write(&config.temp_dir, b"not a directory").unwrap();

        let err = run(&config).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Transform(TransformError::Clean(StageError::Snapshot(_)))
        ));
    }
}
