//! Zip bundling.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::ReportError;

/// Pack `(name, bytes)` entries in order. Entry timestamps are fixed so the
/// archive bytes only depend on the entries.
pub fn bundle(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>, ReportError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in entries {
        writer.start_file(name.as_str(), options)?;
        writer.write_all(bytes)?;
    }
    Ok(writer.finish()?.into_inner())
}

/// Make `name` unique among `taken` by inserting `-2`, `-3`, ... before the
/// extension.
pub fn unique_name(taken: &mut HashSet<String>, stem: &str, extension: &str) -> String {
    let mut candidate = format!("{stem}.{extension}");
    let mut n = 2;
    while taken.contains(&candidate) {
        candidate = format!("{stem}-{n}.{extension}");
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}
