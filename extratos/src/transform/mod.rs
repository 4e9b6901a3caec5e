//! Transformation module.
//!
//! Turns the loaded tables into the final statement table:
//! - Clean: reseller name extraction, client id padding, key normalization
//! - Merge: left join on the reseller name
//! - Payout: truncated payout and seller filter
//! - Pipeline: stage sequencing, snapshots and the full run

pub mod clean;
pub mod merge;
pub mod payout;
pub mod pipeline;

pub use clean::{clean_tables, extract_reseller_name, normalize_client_id, normalize_key};
pub use merge::{merge_tables, MergeStats};
pub use payout::{calculate_payout, is_valid_seller, payout_cell, truncated_payout, PayoutStats};
pub use pipeline::{run, transform, RunSummary, TransformSummary};
