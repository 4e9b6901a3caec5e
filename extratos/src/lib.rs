//! # Extratos - per-seller commission statements
//!
//! Reads a receivables export and a reseller commission table, joins them on
//! the reseller name found in each client's name, computes the payout owed
//! on every received installment and writes one spreadsheet per seller.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ input/*.xls │────▶│   Parser    │────▶│  Transform  │────▶│   Report    │
//! │ comissoes   │     │ (calamine)  │     │ clean/merge │     │ per seller  │
//! └─────────────┘     └─────────────┘     │  /payout    │     └─────────────┘
//!                                         └──────┬──────┘
//!                                                ▼
//!                                          temp_files/1-3
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use extratos::{run, Config};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let summary = run(&Config::from_env()?)?;
//!     println!("Wrote {} statements", summary.save.files_written());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Paths, column names and business constants
//! - [`error`] - Hierarchical error types
//! - [`logs`] - Progress logging
//! - [`models`] - In-memory table and cell types
//! - [`parser`] - Spreadsheet loading
//! - [`transform`] - Clean, merge, payout and the pipeline
//! - [`report`] - Per-seller statement export

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Loading
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod report;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    LoadError,
    PipelineError,
    PipelineResult,
    SaveError,
    StageError,
    TransformError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use config::{ColumnNames, Config};
pub use models::{Cell, Table};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use parser::{load, load_file};
pub use report::{save, SaveSummary, SellerStatement};
pub use transform::pipeline::{
    run,
    transform,
    RunSummary,
    TransformSummary,
    CLEAN_SNAPSHOT,
    FINAL_SNAPSHOT,
    MERGE_SNAPSHOT,
};
