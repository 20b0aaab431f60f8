use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An uploaded spreadsheet reduced to what the validators need: sheets of rows
/// of cell text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub file_name: String,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

impl Document {
    #[must_use]
    pub fn new(file_name: impl Into<String>, sheets: Vec<Sheet>) -> Self {
        Self {
            file_name: file_name.into(),
            sheets,
        }
    }

    /// Number of cells holding non-empty text. This is the denominator for
    /// validation progress and success rates.
    #[must_use]
    pub fn total_cells(&self) -> usize {
        self.sheets
            .iter()
            .flat_map(|sheet| sheet.rows.iter())
            .flat_map(|row| row.iter())
            .filter(|text| !text.is_empty())
            .count()
    }

    /// Non-empty cells in sheet → row → column order.
    pub fn cells(&self) -> impl Iterator<Item = (CellLocation, &str)> + '_ {
        self.sheets.iter().flat_map(|sheet| {
            sheet.rows.iter().enumerate().flat_map(move |(r, row)| {
                row.iter().enumerate().filter_map(move |(c, text)| {
                    if text.is_empty() {
                        None
                    } else {
                        Some((
                            CellLocation::new(&sheet.name, to_u32(r + 1), to_u32(c + 1)),
                            text.as_str(),
                        ))
                    }
                })
            })
        })
    }
}

impl Sheet {
    #[must_use]
    pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// Where a cell lives. `row` and `column` are 1-based; `cell` is the A1 address.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct CellLocation {
    pub sheet: String,
    pub row: u32,
    pub column: u32,
    pub cell: String,
}

impl CellLocation {
    #[must_use]
    pub fn new(sheet: &str, row: u32, column: u32) -> Self {
        Self {
            sheet: sheet.to_string(),
            row,
            column,
            cell: format!("{}{row}", column_letter(column)),
        }
    }
}

/// Spreadsheet column name for a 1-based column index (`1 → A`, `27 → AA`).
#[must_use]
pub fn column_letter(column: u32) -> String {
    let mut n = column;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + u8::try_from(rem).unwrap_or(0)));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn column_letters_follow_spreadsheet_naming() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(52), "AZ");
        assert_eq!(column_letter(703), "AAA");
        assert_eq!(column_letter(0), "");
    }

    #[test]
    fn cells_skip_empty_text_and_keep_order() {
        let doc = Document::new(
            "a.xlsx",
            vec![
                Sheet::new("S1", vec![row(&["x", "", "y"]), row(&["z"])]),
                Sheet::new("S2", vec![row(&["", "w"])]),
            ],
        );

        let cells: Vec<(String, String)> = doc
            .cells()
            .map(|(loc, text)| (format!("{}!{}", loc.sheet, loc.cell), text.to_string()))
            .collect();

        assert_eq!(
            cells,
            vec![
                ("S1!A1".to_string(), "x".to_string()),
                ("S1!C1".to_string(), "y".to_string()),
                ("S1!A2".to_string(), "z".to_string()),
                ("S2!B1".to_string(), "w".to_string()),
            ]
        );
        assert_eq!(doc.total_cells(), 4);
    }
}
