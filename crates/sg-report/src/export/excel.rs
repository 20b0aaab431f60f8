//! Excel rendering.
//!
//! Two worksheets: `Summary` with one line per file and `Findings` with one
//! line per finding. The document creation time is pinned so identical input
//! yields identical bytes.

use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook, Worksheet, XlsxError};

use sg_core::entities::ValidationResult;

use super::rows::{COLUMNS, finding_rows};
use crate::error::ReportError;

const SUMMARY_COLUMNS: [&str; 8] = [
    "file_name",
    "category",
    "status",
    "total_cells",
    "checked_cells",
    "errors",
    "warnings",
    "info",
];

pub fn render(results: &[&ValidationResult]) -> Result<Vec<u8>, ReportError> {
    let mut workbook = Workbook::new();
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));
    let header = Format::new().set_bold();

    let summary = workbook.add_worksheet();
    summary.set_name("Summary")?;
    write_header(summary, &SUMMARY_COLUMNS, &header)?;
    for (index, result) in results.iter().enumerate() {
        let row = row_number(index + 1)?;
        summary.write_string(row, 0, result.file_name.as_str())?;
        summary.write_string(row, 1, result.category.as_str())?;
        summary.write_string(row, 2, result.status.as_str())?;
        for (col, count) in [
            (3, result.summary.total_cells),
            (4, result.summary.checked_cells),
            (5, result.summary.error_count),
            (6, result.summary.warning_count),
            (7, result.summary.info_count),
        ] {
            summary.write_number(row, col, to_f64(count))?;
        }
    }

    let findings = workbook.add_worksheet();
    findings.set_name("Findings")?;
    write_header(findings, &COLUMNS, &header)?;
    findings.set_freeze_panes(1, 0)?;
    for (index, line) in finding_rows(results).iter().enumerate() {
        let row = row_number(index + 1)?;
        for (col, value) in line.cells().into_iter().enumerate() {
            let col = u16::try_from(col).unwrap_or(u16::MAX);
            findings.write_string(row, col, value)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_header(sheet: &mut Worksheet, columns: &[&str], format: &Format) -> Result<(), XlsxError> {
    for (col, name) in columns.iter().enumerate() {
        let col = u16::try_from(col).unwrap_or(u16::MAX);
        sheet.write_string_with_format(0, col, *name, format)?;
        sheet.set_column_width(col, 16)?;
    }
    Ok(())
}

fn row_number(index: usize) -> Result<u32, XlsxError> {
    u32::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

#[allow(clippy::cast_precision_loss)]
const fn to_f64(count: usize) -> f64 {
    count as f64
}
