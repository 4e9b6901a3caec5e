//! Run configuration: file locations and column names.
//!
//! Everything has a compiled-in default rooted at `data/`. Two environment
//! variables can override it:
//!
//! - `EXTRATOS_DATA_DIR` re-roots every path
//! - `EXTRATOS_CONFIG` points to a JSON file whose fields replace the defaults

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, LoadError, LoadResult};

/// Environment variable that re-roots the data directory.
pub const DATA_DIR_ENV: &str = "EXTRATOS_DATA_DIR";

/// Environment variable naming a JSON config file.
pub const CONFIG_FILE_ENV: &str = "EXTRATOS_CONFIG";

const DEFAULT_DATA_DIR: &str = "data";

/// Column headers used by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub client_id: String,
    pub client_name: String,
    pub competence_date: String,
    pub due_date: String,
    pub original_amount: String,
    pub received_amount: String,
    pub last_payment_date: String,

    /// Derived from the client name during cleaning.
    pub reseller_name: String,
    /// Join key in the commissions table.
    pub resellers: String,
    pub sellers: String,
    pub commission: String,
    /// Derived payout column.
    pub payout: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            client_id: "Identificador do cliente".to_string(),
            client_name: "Nome do cliente".to_string(),
            competence_date: "Data de competência".to_string(),
            due_date: "Data de vencimento".to_string(),
            original_amount: "Valor original da parcela (R$)".to_string(),
            received_amount: "Valor recebido da parcela (R$)".to_string(),
            last_payment_date: "Data do último pagamento".to_string(),
            reseller_name: "nome_resseller".to_string(),
            resellers: "RESSELLERS".to_string(),
            sellers: "SELLERS".to_string(),
            commission: "COMISSÃO".to_string(),
            payout: "TOTAL DO REPASSE (R$)".to_string(),
        }
    }
}

impl ColumnNames {
    /// Columns kept from the receivables spreadsheet.
    pub fn receivables(&self) -> Vec<String> {
        vec![
            self.client_id.clone(),
            self.client_name.clone(),
            self.competence_date.clone(),
            self.due_date.clone(),
            self.original_amount.clone(),
            self.received_amount.clone(),
            self.last_payment_date.clone(),
        ]
    }

    /// Identifier and join-key columns, read as text even when they look
    /// like numbers.
    pub fn identifiers(&self) -> Vec<String> {
        vec![
            self.client_id.clone(),
            self.client_name.clone(),
            self.resellers.clone(),
            self.sellers.clone(),
        ]
    }
}

/// Pipeline configuration, passed explicitly to every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory searched for the receivables spreadsheet.
    pub input_dir: PathBuf,
    /// Glob matched inside `input_dir`; first match (sorted) wins.
    pub receivables_pattern: String,
    pub commissions_file: PathBuf,
    /// One statement per seller is written here.
    pub output_dir: PathBuf,
    /// Debug snapshots of each transform stage.
    pub temp_dir: PathBuf,
    pub write_snapshots: bool,
    /// Seller value meaning "no seller assigned".
    pub no_seller_marker: String,
    pub client_id_width: usize,
    pub total_label: String,
    pub columns: ColumnNames,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_data_dir(DEFAULT_DATA_DIR)
    }
}

impl Config {
    /// Default layout rooted at `dir`.
    pub fn with_data_dir(dir: impl AsRef<Path>) -> Self {
        let data_dir = dir.as_ref();
        Self {
            input_dir: data_dir.join("input"),
            receivables_pattern: "*.xls".to_string(),
            commissions_file: data_dir.join("comissoes.xlsx"),
            output_dir: data_dir.join("output"),
            temp_dir: data_dir.join("temp_files"),
            write_snapshots: true,
            no_seller_marker: "SEM SELLER".to_string(),
            client_id_width: 14,
            total_label: "TOTAL".to_string(),
            columns: ColumnNames::default(),
        }
    }

    /// Build the configuration from the environment.
    ///
    /// `EXTRATOS_CONFIG` wins over `EXTRATOS_DATA_DIR`; fields missing from
    /// the JSON file fall back to the (possibly re-rooted) defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) => Self::with_data_dir(PathBuf::from(dir)),
            None => Self::default(),
        };

        match std::env::var_os(CONFIG_FILE_ENV) {
            Some(path) => Self::from_json_file(Path::new(&path), base),
            None => Ok(base),
        }
    }

    /// Overlay a JSON file onto `base`.
    pub fn from_json_file(path: &Path, base: Config) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content, base).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay JSON text onto `base`. Only top-level keys present in the
    /// JSON are replaced; `columns` is merged key by key.
    pub fn from_json(content: &str, base: Config) -> Result<Self, serde_json::Error> {
        let mut merged = serde_json::to_value(&base)?;
        let overrides: serde_json::Value = serde_json::from_str(content)?;
        merge_json(&mut merged, overrides);
        serde_json::from_value(merged)
    }

    /// Locate the receivables spreadsheet.
    pub fn receivables_path(&self) -> LoadResult<PathBuf> {
        let pattern = self.input_dir.join(&self.receivables_pattern);
        let pattern = pattern.to_string_lossy().to_string();

        let mut matches: Vec<PathBuf> = glob::glob(&pattern)
            .map_err(|e| LoadError::Read {
                path: self.input_dir.clone(),
                message: format!("invalid pattern '{}': {}", pattern, e),
            })?
            .collect::<Result<Vec<PathBuf>, glob::GlobError>>()
            .map_err(|e| LoadError::Read {
                path: e.path().to_path_buf(),
                message: e.error().to_string(),
            })?;
        matches.sort();

        matches
            .into_iter()
            .next()
            .ok_or(LoadError::NotFound(pattern))
    }
}

/// Recursively overlay `overrides` onto `target`.
fn merge_json(target: &mut serde_json::Value, overrides: serde_json::Value) {
    match (target, overrides) {
        (serde_json::Value::Object(target), serde_json::Value::Object(overrides)) => {
            for (key, value) in overrides {
                match target.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, overrides) => *target = overrides,
    }
}
