//! # sg-report
//!
//! Turns validation results into numbers and files.
//!
//! - [`aggregate`]: batch totals, category buckets joined on file name, and
//!   success rates.
//! - [`export`]: xlsx, csv, json, and zip artifacts with the merge policy.

pub mod aggregate;
pub mod error;
pub mod export;

pub use aggregate::{
    BatchStats, CategoryGroup, UNCLASSIFIED, aggregate, group_by_category, overall_success_rate,
    success_rate,
};
pub use error::ReportError;
pub use export::{Artifact, ExportRequest, ResultSource, export};
