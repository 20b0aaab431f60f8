//! Report export.
//!
//! | format            | merged | ids | artifact                              |
//! |-------------------|--------|-----|---------------------------------------|
//! | zip               | any    | any | archive, one `.xlsx` per result       |
//! | excel, csv, json  | yes    | any | one file with every result's findings |
//! | excel, csv, json  | no     | 1   | that result's file                    |
//! | excel, csv, json  | no     | 2+  | archive of per-result files           |
//!
//! Every id is resolved before anything is rendered; one unknown id fails the
//! whole export.

mod archive;
mod delimited;
mod excel;
mod json;
mod rows;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use sg_core::entities::ValidationResult;
use sg_core::enums::ExportFormat;

use crate::error::ReportError;

pub use rows::COLUMNS;

/// Where the exporter looks up results by id.
pub trait ResultSource {
    fn lookup(&self, id: &str) -> Option<&ValidationResult>;
}

impl ResultSource for HashMap<String, ValidationResult> {
    fn lookup(&self, id: &str) -> Option<&ValidationResult> {
        self.get(id)
    }
}

impl ResultSource for [ValidationResult] {
    fn lookup(&self, id: &str) -> Option<&ValidationResult> {
        self.iter().find(|r| r.id == id)
    }
}

impl ResultSource for Vec<ValidationResult> {
    fn lookup(&self, id: &str) -> Option<&ValidationResult> {
        self.as_slice().lookup(id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub result_ids: Vec<String>,
    pub format: ExportFormat,
    #[serde(default)]
    pub merge_results: bool,
}

/// A rendered report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Write the artifact into `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Io` if the directory or file cannot be written.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ReportError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Render the requested results.
///
/// # Errors
///
/// Returns `ReportError::EmptyRequest` for an empty id list,
/// `ReportError::UnknownResult` naming the first unknown id, or the
/// rendering error of the chosen format.
pub fn export<S>(request: &ExportRequest, source: &S) -> Result<Artifact, ReportError>
where
    S: ResultSource + ?Sized,
{
    if request.result_ids.is_empty() {
        return Err(ReportError::EmptyRequest);
    }
    let results = request
        .result_ids
        .iter()
        .map(|id| {
            source
                .lookup(id)
                .ok_or_else(|| ReportError::UnknownResult(id.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let artifact = match (request.format, request.merge_results, results.as_slice()) {
        (ExportFormat::Zip, _, _) => bundle(&results, ExportFormat::Excel)?,
        (format, true, _) => Artifact {
            file_name: format!("merged-report.{}", format.extension()),
            content_type: format.content_type(),
            bytes: render(format, &results, true)?,
        },
        (format, false, [single]) => Artifact {
            file_name: format!("{}.{}", report_stem(single), format.extension()),
            content_type: format.content_type(),
            bytes: render(format, &results, false)?,
        },
        (format, false, _) => bundle(&results, format)?,
    };

    tracing::debug!(
        format = %request.format,
        merged = request.merge_results,
        results = results.len(),
        file = %artifact.file_name,
        bytes = artifact.bytes.len(),
        "report exported"
    );
    Ok(artifact)
}

fn render(
    format: ExportFormat,
    results: &[&ValidationResult],
    merged: bool,
) -> Result<Vec<u8>, ReportError> {
    match format {
        ExportFormat::Excel => excel::render(results),
        ExportFormat::Csv => delimited::render(results),
        ExportFormat::Json => json::render(results, merged),
        ExportFormat::Zip => bundle(results, ExportFormat::Excel).map(|a| a.bytes),
    }
}

/// One archive entry per result, rendered in `format`.
fn bundle(results: &[&ValidationResult], format: ExportFormat) -> Result<Artifact, ReportError> {
    let mut taken = HashSet::new();
    let entries = results
        .iter()
        .map(|result| {
            let name = archive::unique_name(&mut taken, &report_stem(result), format.extension());
            render(format, std::slice::from_ref(result), false).map(|bytes| (name, bytes))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Artifact {
        file_name: "reports.zip".to_string(),
        content_type: ExportFormat::Zip.content_type(),
        bytes: archive::bundle(&entries)?,
    })
}

/// `출결.xlsx` becomes `출결-report`; path separators are replaced.
fn report_stem(result: &ValidationResult) -> String {
    let stem = Path::new(&result.file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("result");
    format!("{}-report", stem.replace(['/', '\\'], "_"))
}
