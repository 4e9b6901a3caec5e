//! Error types for the commission statement pipeline.
//!
//! One enum per pipeline layer:
//!
//! - [`LoadError`] - reading the input spreadsheets
//! - [`TransformError`] - clean / merge / calculate stages
//! - [`SaveError`] - writing snapshots and seller statements
//! - [`ConfigError`] - loading configuration overrides
//! - [`PipelineError`] - top-level orchestration
//!
//! Conversion into [`PipelineError`] is automatic via `From`,
//! allowing `?` to work across stage boundaries.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while reading an input spreadsheet.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File (or glob match) does not exist.
    #[error("File not found: {0}")]
    NotFound(String),

    /// File has no worksheet or no header row.
    #[error("File is empty: {}", .0.display())]
    Empty(PathBuf),

    /// Not a spreadsheet calamine can decode.
    #[error("Invalid file type '{}': {message}", path.display())]
    InvalidFormat { path: PathBuf, message: String },

    /// Required columns absent from the header row.
    #[error("Missing columns in '{}': {}", path.display(), columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    /// Any other read failure.
    #[error("Failed to read '{}': {message}", path.display())]
    Read { path: PathBuf, message: String },
}

// =============================================================================
// Transform Errors
// =============================================================================

/// A failure inside one transform stage.
#[derive(Debug, Error)]
pub enum StageError {
    /// Column the stage depends on is not in the table.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Amount or rate cell holds something other than a number.
    #[error("Invalid number '{value}' in column '{column}' (data row {row})")]
    InvalidNumber {
        column: String,
        /// 1-based position among the table's data rows.
        row: usize,
        value: String,
    },

    /// Debug snapshot could not be written.
    #[error("Snapshot failed: {0}")]
    Snapshot(#[from] SaveError),
}

/// Errors during the transform stages, tagged with the failing stage.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Failed to clean tables: {0}")]
    Clean(#[source] StageError),

    #[error("Failed to merge tables: {0}")]
    Merge(#[source] StageError),

    #[error("Failed to calculate payout: {0}")]
    Calculate(#[source] StageError),
}

// =============================================================================
// Save Errors
// =============================================================================

/// Errors while writing spreadsheets to disk.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Cannot create directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write '{}': {message}", path.display())]
    Write { path: PathBuf, message: String },

    /// Column needed to split statements is not in the table.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Two sellers map to the same statement file.
    #[error("Sellers '{first}' and '{second}' would both be written to '{file}'")]
    NameCollision {
        file: String,
        first: String,
        second: String,
    },
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors while loading configuration overrides.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors, one variant per stage.
///
/// Returned by [`crate::transform::pipeline::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Save error: {0}")]
    Save(#[from] SaveError),

    #[error("Error: {0}")]
    Config(#[from] ConfigError),
}

impl PipelineError {
    /// The single line shown to the user when a run fails.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Short name of the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Load(_) => "load",
            PipelineError::Transform(_) => "transform",
            PipelineError::Save(_) => "save",
            PipelineError::Config(_) => "config",
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loading.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for a single transform stage.
pub type StageResult<T> = Result<T, StageError>;

/// Result type for the transform stages.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for writing.
pub type SaveResult<T> = Result<T, SaveError>;

/// Result type for pipeline runs.
pub type PipelineResult<T> = Result<T, PipelineError>;
