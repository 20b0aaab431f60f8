//! Turns files on disk into uploads.
//!
//! `.json` files hold a serialized [`Document`]; `.csv` files become a
//! single-sheet document named after the file stem.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use sg_core::entities::{Document, Sheet};
use sg_engine::Upload;

const BOM: char = '\u{feff}';

pub fn load_all(paths: &[PathBuf]) -> anyhow::Result<Vec<Upload>> {
    paths.iter().map(|path| load(path)).collect()
}

pub fn load(path: &Path) -> anyhow::Result<Upload> {
    let file_size = std::fs::metadata(path)
        .with_context(|| format!("cannot read {}", path.display()))?
        .len();
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))?
        .to_string();

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let document = match extension.as_deref() {
        Some("json") => load_json(path, &file_name)?,
        Some("csv") => load_csv(path, &file_name)?,
        _ => bail!(
            "unsupported document {}: expected a .json or .csv file",
            path.display()
        ),
    };

    tracing::debug!(
        file = %file_name,
        sheets = document.sheets.len(),
        cells = document.total_cells(),
        "document loaded"
    );
    Ok(Upload::new(document.file_name.clone(), file_size, document))
}

fn load_json(path: &Path, file_name: &str) -> anyhow::Result<Document> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let mut document: Document = serde_json::from_str(raw.trim_start_matches(BOM))
        .with_context(|| format!("{} is not a valid document", path.display()))?;
    if document.file_name.trim().is_empty() {
        document.file_name = file_name.to_string();
    }
    Ok(document)
}

fn load_csv(path: &Path, file_name: &str) -> anyhow::Result<Document> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("malformed csv in {}", path.display()))?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }
    if let Some(first) = rows.first_mut().and_then(|row| row.first_mut())
        && first.starts_with(BOM)
    {
        *first = first.trim_start_matches(BOM).to_string();
    }

    let sheet_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("Sheet1");
    Ok(Document::new(file_name, vec![Sheet::new(sheet_name, rows)]))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn csv_becomes_one_sheet_named_after_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("출결.csv");
        std::fs::write(&path, "\u{feff}이름,결석\n김철수,2\n이영희\n").unwrap();

        let upload = load(&path).unwrap();
        assert_eq!(upload.file_name, "출결.csv");
        let sheet = &upload.document.sheets[0];
        assert_eq!(sheet.name, "출결");
        assert_eq!(
            sheet.rows,
            vec![
                vec!["이름".to_string(), "결석".to_string()],
                vec!["김철수".to_string(), "2".to_string()],
                vec!["이영희".to_string()],
            ]
        );
    }

    #[test]
    fn json_document_keeps_its_own_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        std::fs::write(
            &path,
            r#"{"fileName":"1반 세특.xlsx","sheets":[{"name":"세특","rows":[["성실함"]]}]}"#,
        )
        .unwrap();

        let upload = load(&path).unwrap();
        assert_eq!(upload.file_name, "1반 세특.xlsx");
        assert_eq!(upload.document.total_cells(), 1);
        assert!(upload.file_size > 0);
    }

    #[test]
    fn other_extensions_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.xlsx");
        std::fs::write(&path, b"PK").unwrap();

        let error = load(&path).unwrap_err();
        assert!(error.to_string().contains("unsupported document"));
    }

    #[test]
    fn missing_files_name_the_path() {
        let error = load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(format!("{error:#}").contains("/definitely/not/here.json"));
    }
}
