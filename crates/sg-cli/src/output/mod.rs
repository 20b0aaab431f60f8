use serde::Serialize;
use serde_json::{Map, Value};

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(value),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

fn render_table<T: Serialize>(value: &T) -> anyhow::Result<String> {
    match serde_json::to_value(value)? {
        Value::Array(items) => Ok(render_array_table(&items)),
        Value::Object(map) => Ok(render_object(map)),
        scalar => Ok(table::render_entity_table(
            &["value"],
            &[vec![value_to_cell(&scalar)]],
            options(),
        )),
    }
}

/// Scalars become a key/value table; every array of objects gets its own
/// titled table below it.
fn render_object(map: Map<String, Value>) -> String {
    let mut scalars = Vec::new();
    let mut sections = Vec::new();
    for (key, value) in map {
        match value {
            Value::Array(items) if items.iter().all(Value::is_object) && !items.is_empty() => {
                sections.push(format!("{key}\n{}", render_array_table(&items)));
            }
            other => scalars.push(vec![key, value_to_cell(&other)]),
        }
    }

    let mut blocks = Vec::with_capacity(1 + sections.len());
    if !scalars.is_empty() {
        blocks.push(table::render_entity_table(&["key", "value"], &scalars, options()));
    }
    blocks.extend(sections);
    blocks.join("\n\n")
}

fn render_array_table(items: &[Value]) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    if !items.iter().all(Value::is_object) {
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell(item)])
            .collect::<Vec<_>>();
        return table::render_entity_table(&["value"], &rows, options());
    }

    let mut headers = Vec::<String>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| map.get(header).map_or_else(|| String::from("-"), value_to_cell))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    table::render_entity_table(&header_refs, &rows, options())
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::render;
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Line {
        file: &'static str,
        errors: u32,
    }

    #[derive(Serialize)]
    struct Report {
        session: &'static str,
        categories: Vec<&'static str>,
        files: Vec<Line>,
    }

    fn report() -> Report {
        Report {
            session: "ses-1",
            categories: vec!["attendance", "behavior"],
            files: vec![
                Line {
                    file: "출결.json",
                    errors: 2,
                },
                Line {
                    file: "행특.json",
                    errors: 0,
                },
            ],
        }
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let out = render(&report(), OutputFormat::Raw).expect("raw render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["files"][0]["errors"], 2);
        assert!(!out.contains('\n'));
    }

    #[test]
    fn table_splits_nested_rows_into_sections() {
        let out = render(&report(), OutputFormat::Table).expect("table render should work");
        let blocks: Vec<&str> = out.split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains("ses-1"));
        assert!(blocks[0].contains("attendance, behavior"));
        assert!(blocks[1].starts_with("files\n"));
        assert!(blocks[1].contains("출결.json"));
    }

    #[test]
    fn array_table_has_a_column_per_field() {
        let out = render(&report().files, OutputFormat::Table).expect("table render should work");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("file"));
        assert!(lines[0].contains("errors"));
        assert!(lines[1].chars().all(|c| c == '-'));
    }
}
