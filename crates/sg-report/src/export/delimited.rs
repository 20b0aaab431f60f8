//! CSV rendering.

use sg_core::entities::ValidationResult;

use super::rows::{COLUMNS, finding_rows};
use crate::error::ReportError;

/// One header row, then one row per finding. A UTF-8 BOM leads the file so
/// spreadsheet programs detect the encoding of Korean text.
pub fn render(results: &[&ValidationResult]) -> Result<Vec<u8>, ReportError> {
    let mut buffer = Vec::from("\u{feff}".as_bytes());
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer.write_record(COLUMNS)?;
        for row in finding_rows(results) {
            writer.write_record(row.cells())?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}
