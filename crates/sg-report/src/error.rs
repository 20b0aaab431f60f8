//! Report error types for sg-report.

use thiserror::Error;

/// Errors from aggregation and export.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A requested result id is not known. The whole export is refused.
    #[error("Export failed: unknown result id {0}")]
    UnknownResult(String),

    /// The request named no result ids.
    #[error("Export failed: no result ids requested")]
    EmptyRequest,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
