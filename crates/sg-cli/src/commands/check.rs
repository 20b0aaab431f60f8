use std::path::PathBuf;

use anyhow::{Context, bail};
use serde::Serialize;
use sg_config::SgConfig;
use sg_core::entities::ValidationResult;
use sg_core::enums::ProcessingStatus;
use sg_engine::Engine;
use sg_report::{
    BatchStats, CategoryGroup, ExportRequest, aggregate, export, group_by_category,
    overall_success_rate,
};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::CheckArgs;
use crate::loader;
use crate::output::output;
use crate::progress::Progress;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub session_id: String,
    /// Every file validated to completion.
    pub success: bool,
    pub overall_success_rate: u8,
    #[serde(flatten)]
    pub stats: BatchStats,
    pub files: Vec<FileLine>,
    pub categories: Vec<CategoryLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileLine {
    pub file: String,
    pub category: String,
    pub status: ProcessingStatus,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub checked: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryLine {
    pub category: String,
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
    pub success_rate: u8,
}

impl From<&ValidationResult> for FileLine {
    fn from(result: &ValidationResult) -> Self {
        Self {
            file: result.file_name.clone(),
            category: result.category.clone(),
            status: result.status,
            errors: result.errors.len(),
            warnings: result.warnings.len(),
            info: result.info.len(),
            checked: format!(
                "{}/{}",
                result.summary.checked_cells, result.summary.total_cells
            ),
            failure: result.failure_reason.clone(),
        }
    }
}

impl From<&CategoryGroup> for CategoryLine {
    fn from(group: &CategoryGroup) -> Self {
        Self {
            category: group.category.clone(),
            files: group.stats.total_files,
            errors: group.stats.total_errors,
            warnings: group.stats.total_warnings,
            success_rate: group.success_rate,
        }
    }
}

/// Handle `sgc check`.
pub async fn handle(args: &CheckArgs, config: &SgConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = execute(args, config).await?;
    output(&report, flags.format)
}

pub async fn execute(args: &CheckArgs, config: &SgConfig) -> anyhow::Result<CheckReport> {
    let uploads = loader::load_all(&args.paths)?;
    let engine = Engine::new(config);
    let session = engine
        .create_session()
        .await
        .context("failed to create session")?;
    engine
        .ingest_many(&session.id, uploads)
        .await
        .context("failed to ingest documents")?;
    narrow_to_categories(&engine, &session.id, &args.categories).await?;

    let results = if args.run_async {
        run_async(&engine, &session.id).await?
    } else {
        run_sync(&engine, &session.id).await?
    };

    let snapshot = engine.session(&session.id).await?;
    let groups = group_by_category(&results, &snapshot.files);
    let mut report = CheckReport {
        session_id: session.id.clone(),
        success: results
            .iter()
            .all(|r| r.status == ProcessingStatus::Completed),
        overall_success_rate: overall_success_rate(&groups),
        stats: aggregate(&results),
        files: results.iter().map(FileLine::from).collect(),
        categories: groups.iter().map(CategoryLine::from).collect(),
        report: None,
    };

    if let Some(format) = args.export {
        let request = ExportRequest {
            result_ids: results.iter().map(|r| r.id.clone()).collect(),
            format: format.into(),
            merge_results: args.merge,
        };
        let artifact = export(&request, results.as_slice()).context("failed to export report")?;
        let dir = args
            .out
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.report.output_dir));
        let path = artifact
            .write_to(&dir)
            .with_context(|| format!("failed to write report into {}", dir.display()))?;
        tracing::info!(path = %path.display(), bytes = artifact.bytes.len(), "report written");
        report.report = Some(path);
    }

    Ok(report)
}

/// Drop every file outside `categories`. An empty list keeps everything.
async fn narrow_to_categories(
    engine: &Engine,
    session_id: &str,
    categories: &[String],
) -> anyhow::Result<()> {
    if categories.is_empty() {
        return Ok(());
    }
    let session = engine.session(session_id).await?;
    let mut kept = 0usize;
    for file in &session.files {
        if categories.contains(&file.category) {
            kept += 1;
        } else {
            tracing::debug!(file = %file.file_name, category = %file.category, "skipped by category filter");
            engine.remove_file(session_id, &file.id).await?;
        }
    }
    if kept == 0 {
        bail!("no documents classified as {}", categories.join(", "));
    }
    Ok(())
}

async fn run_sync(engine: &Engine, session_id: &str) -> anyhow::Result<Vec<ValidationResult>> {
    let spinner = Progress::spinner("validating");
    match engine.validate_session(session_id).await {
        Ok(validation) => {
            spinner.finish_clear();
            Ok(validation.results)
        }
        Err(error) => {
            spinner.finish_err("validation failed");
            Err(error).context("validation failed")
        }
    }
}

async fn run_async(engine: &Engine, session_id: &str) -> anyhow::Result<Vec<ValidationResult>> {
    let started = engine
        .start_validation(session_id)
        .await
        .context("failed to start validation")?;
    let bar = Progress::percent("validating");

    let status = if started.is_terminal() {
        started
    } else {
        engine
            .wait_for_validation(session_id, |status| {
                bar.set_position(status.progress);
                if let Some(file) = &status.current_file {
                    bar.set_message(file);
                }
            })
            .await
            .inspect_err(|_| bar.finish_err("gave up waiting"))
            .context("failed while waiting for validation")?
    };

    if status.status == ProcessingStatus::Failed {
        bar.finish_err("validation failed");
        bail!(
            "validation failed: {}",
            status.error.as_deref().unwrap_or("unknown error")
        );
    }
    bar.finish_clear();
    Ok(status.results)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    fn write_csv(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    fn args(paths: Vec<PathBuf>) -> CheckArgs {
        CheckArgs {
            paths,
            categories: Vec::new(),
            run_async: false,
            export: None,
            merge: false,
            out: None,
        }
    }

    fn fixtures(dir: &Path) -> Vec<PathBuf> {
        vec![
            write_csv(dir, "출결.csv", "이름,결석,지각\n김철수,2,0\n"),
            write_csv(
                dir,
                "세특.csv",
                "과목,세부능력 및 특기사항\n국어,수업에     적극적으로 참여함\n",
            ),
        ]
    }

    #[tokio::test]
    async fn check_reports_every_file_and_category() {
        let dir = tempfile::tempdir().unwrap();
        let report = execute(&args(fixtures(dir.path())), &SgConfig::default())
            .await
            .unwrap();

        assert!(report.success);
        assert_eq!(report.stats.total_files, 2);
        let files: Vec<&str> = report.files.iter().map(|f| f.file.as_str()).collect();
        assert_eq!(files, vec!["출결.csv", "세특.csv"]);
        assert_eq!(
            report.categories.iter().map(|c| c.files).sum::<usize>(),
            report.files.len()
        );
        // Five consecutive spaces trip the spacing rule.
        assert!(report.files[1].warnings + report.files[1].errors >= 1);
        assert!(report.report.is_none());
    }

    #[tokio::test]
    async fn category_filter_drops_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut check = args(fixtures(dir.path()));
        check.categories = vec!["attendance".to_string()];

        let report = execute(&check, &SgConfig::default()).await.unwrap();
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].category, "attendance");
    }

    #[tokio::test]
    async fn category_filter_matching_nothing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut check = args(fixtures(dir.path()));
        check.categories = vec!["behavior".to_string()];

        let error = execute(&check, &SgConfig::default()).await.unwrap_err();
        assert!(error.to_string().contains("behavior"));
    }

    #[tokio::test]
    async fn async_run_with_merged_csv_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SgConfig::default();
        config.polling.interval_secs = 0;
        config.polling.max_attempts = 10_000;

        let mut check = args(fixtures(dir.path()));
        check.run_async = true;
        check.export = Some(crate::cli::root_commands::ExportArg::Csv);
        check.merge = true;
        check.out = Some(dir.path().join("out"));

        let report = execute(&check, &config).await.unwrap();
        assert_eq!(report.files.len(), 2);
        let path = report.report.expect("report path");
        assert_eq!(path, dir.path().join("out").join("merged-report.csv"));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.records().count(), report.stats.total_findings());
    }
}
