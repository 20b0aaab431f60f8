//! Flat finding rows shared by the tabular formats.

use sg_core::entities::{Finding, ValidationResult};

pub const COLUMNS: [&str; 13] = [
    "file_name",
    "sheet",
    "cell",
    "row",
    "column",
    "severity",
    "type",
    "rule",
    "message",
    "original_text",
    "suggestion",
    "highlight_start",
    "highlight_end",
];

/// One finding tagged with the file it came from.
pub struct FindingRow<'a> {
    pub file_name: &'a str,
    pub finding: &'a Finding,
}

impl FindingRow<'_> {
    pub fn cells(&self) -> [String; 13] {
        let finding = self.finding;
        let (start, end) = finding
            .highlight_range
            .map_or((String::new(), String::new()), |r| {
                (r.start.to_string(), r.end.to_string())
            });
        [
            self.file_name.to_string(),
            finding.location.sheet.clone(),
            finding.location.cell.clone(),
            finding.location.row.to_string(),
            finding.location.column.to_string(),
            finding.severity.to_string(),
            finding.finding_type.clone(),
            finding.rule.clone(),
            finding.message.clone(),
            finding.original_text.clone(),
            finding.suggestion.clone().unwrap_or_default(),
            start,
            end,
        ]
    }
}

/// Rows for `results` in input order, each file's findings in cell order.
pub fn finding_rows<'a>(results: &[&'a ValidationResult]) -> Vec<FindingRow<'a>> {
    results
        .iter()
        .flat_map(|&result| {
            result
                .findings_in_cell_order()
                .into_iter()
                .map(move |finding| FindingRow {
                    file_name: &result.file_name,
                    finding,
                })
        })
        .collect()
}
