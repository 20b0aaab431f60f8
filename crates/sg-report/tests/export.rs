//! Export integration tests
//!
//! - Merge policy per format
//! - Atomic failure on unknown ids
//! - Deterministic bytes
//! - Writing artifacts to disk

use std::collections::HashMap;
use std::io::Cursor;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;

use sg_core::entities::{CellLocation, Finding, HighlightRange, ValidationResult};
use sg_core::enums::{ExportFormat, Severity};
use sg_core::ids::finding_id;
use sg_report::{ExportRequest, ReportError, export};

fn finding(result_id: &str, seq: usize, severity: Severity, text: &str) -> Finding {
    let mut finding = Finding {
        id: finding_id(result_id, seq),
        finding_type: "spacing".into(),
        severity,
        message: "연속된 공백".into(),
        location: CellLocation::new("Sheet1", u32::try_from(seq).unwrap(), 2),
        original_text: text.into(),
        rule: "spacing.consecutive".into(),
        confidence: None,
        suggestion: Some(text.split_whitespace().collect::<Vec<_>>().join(" ")),
        highlight_range: None,
        context_before: None,
        context_after: None,
        marked_text: None,
    };
    finding.attach_highlight(HighlightRange::new(3, 8)).unwrap();
    finding
}

fn result(id: &str, file_name: &str, findings: usize) -> ValidationResult {
    let created = Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap();
    let mut result = ValidationResult::new(
        id.to_string(),
        file_name.to_string(),
        "subject_remarks".to_string(),
        10,
        created,
    );
    result.start().unwrap();
    for seq in 1..=findings {
        let severity = if seq % 2 == 0 {
            Severity::Error
        } else {
            Severity::Warning
        };
        result.push_finding(finding(id, seq, severity, "학생은     매우 성실함"));
        result.mark_cell_checked();
    }
    result.complete(created).unwrap();
    result
}

fn source() -> HashMap<String, ValidationResult> {
    [result("val-aaaa", "1반 세특.xlsx", 3), result("val-bbbb", "2반 세특.xlsx", 2)]
        .into_iter()
        .map(|r| (r.id.clone(), r))
        .collect()
}

fn request(format: ExportFormat, merge: bool, ids: &[&str]) -> ExportRequest {
    ExportRequest {
        result_ids: ids.iter().map(|id| (*id).to_string()).collect(),
        format,
        merge_results: merge,
    }
}

fn zip_entry_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Merge policy
// ---------------------------------------------------------------------------

#[test]
fn merged_csv_has_one_row_per_finding_tagged_with_its_file() {
    let source = source();
    let artifact = export(
        &request(ExportFormat::Csv, true, &["val-aaaa", "val-bbbb"]),
        &source,
    )
    .unwrap();
    assert_eq!(artifact.file_name, "merged-report.csv");

    let mut reader = csv::Reader::from_reader(artifact.bytes.as_slice());
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 3 + 2);

    let files: Vec<&str> = rows.iter().map(|r| &r[0]).collect();
    assert_eq!(
        files,
        vec![
            "1반 세특.xlsx",
            "1반 세특.xlsx",
            "1반 세특.xlsx",
            "2반 세특.xlsx",
            "2반 세특.xlsx",
        ]
    );
    // Findings of one file stay in cell order across severities.
    let cells: Vec<&str> = rows.iter().take(3).map(|r| &r[2]).collect();
    assert_eq!(cells, vec!["B1", "B2", "B3"]);
}

#[test]
fn zip_has_one_workbook_per_result_regardless_of_merge() {
    let source = source();
    for merge in [true, false] {
        let artifact = export(
            &request(ExportFormat::Zip, merge, &["val-aaaa", "val-bbbb"]),
            &source,
        )
        .unwrap();
        assert_eq!(artifact.content_type, "application/zip");
        assert_eq!(
            zip_entry_names(&artifact.bytes),
            vec!["1반 세특-report.xlsx", "2반 세특-report.xlsx"]
        );
    }
}

#[rstest]
#[case::excel(ExportFormat::Excel, "xlsx")]
#[case::csv(ExportFormat::Csv, "csv")]
#[case::json(ExportFormat::Json, "json")]
fn unmerged_batch_becomes_a_bundle_in_the_requested_format(
    #[case] format: ExportFormat,
    #[case] extension: &str,
) {
    let source = source();
    let artifact = export(&request(format, false, &["val-aaaa", "val-bbbb"]), &source).unwrap();
    assert_eq!(artifact.file_name, "reports.zip");
    let names = zip_entry_names(&artifact.bytes);
    assert_eq!(names.len(), 2);
    assert!(names.iter().all(|n| n.ends_with(extension)));
}

#[test]
fn merged_json_is_a_full_fidelity_array() {
    let source = source();
    let artifact = export(
        &request(ExportFormat::Json, true, &["val-bbbb", "val-aaaa"]),
        &source,
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&artifact.bytes).unwrap();
    let results = value.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["fileName"], "2반 세특.xlsx");

    let first = &results[1]["warnings"][0];
    assert_eq!(first["highlightRange"]["start"], 3);
    assert_eq!(first["highlightRange"]["end"], 8);
    assert!(first["markedText"].as_str().unwrap().contains("<mark"));

    let recovered: Vec<ValidationResult> = serde_json::from_value(value).unwrap();
    assert_eq!(&recovered[1], &source["val-aaaa"]);
}

#[test]
fn single_result_excel_is_a_workbook() {
    let source = source();
    let artifact = export(&request(ExportFormat::Excel, false, &["val-aaaa"]), &source).unwrap();
    assert_eq!(artifact.file_name, "1반 세특-report.xlsx");
    // xlsx is itself a zip container.
    let names = zip_entry_names(&artifact.bytes);
    assert!(names.iter().any(|n| n == "xl/workbook.xml"));
    assert!(names.iter().any(|n| n.starts_with("xl/worksheets/")));
}

// ---------------------------------------------------------------------------
// Failure and determinism
// ---------------------------------------------------------------------------

#[rstest]
#[case::zip(ExportFormat::Zip)]
#[case::csv(ExportFormat::Csv)]
#[case::excel(ExportFormat::Excel)]
fn any_unknown_id_fails_the_whole_export(#[case] format: ExportFormat) {
    let source = source();
    let err = export(
        &request(format, true, &["val-aaaa", "val-missing", "val-bbbb"]),
        &source,
    )
    .unwrap_err();
    match err {
        ReportError::UnknownResult(id) => assert_eq!(id, "val-missing"),
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
#[case::excel(ExportFormat::Excel, true)]
#[case::csv(ExportFormat::Csv, true)]
#[case::json(ExportFormat::Json, false)]
#[case::zip(ExportFormat::Zip, false)]
fn identical_input_gives_identical_bytes(#[case] format: ExportFormat, #[case] merge: bool) {
    let source = source();
    let req = request(format, merge, &["val-aaaa", "val-bbbb"]);
    let first = export(&req, &source).unwrap();
    let second = export(&req, &source).unwrap();
    assert_eq!(first.bytes, second.bytes);
}

#[test]
fn slices_work_as_a_result_source() {
    let results = vec![result("val-aaaa", "a.xlsx", 1)];
    let artifact = export(
        &request(ExportFormat::Csv, false, &["val-aaaa"]),
        results.as_slice(),
    )
    .unwrap();
    assert_eq!(artifact.file_name, "a-report.csv");
}

#[test]
fn artifacts_are_written_into_the_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let source = source();
    let artifact = export(&request(ExportFormat::Csv, true, &["val-aaaa"]), &source).unwrap();

    let path = artifact.write_to(&dir.path().join("reports")).unwrap();
    assert_eq!(path.file_name().unwrap(), "merged-report.csv");
    assert_eq!(std::fs::read(&path).unwrap(), artifact.bytes);
}
