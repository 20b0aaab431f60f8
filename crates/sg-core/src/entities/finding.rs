use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::CellLocation;
use crate::enums::Severity;
use crate::errors::CoreError;
use crate::highlight;

/// A single rule violation or informational note attached to one cell.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub id: String,
    #[serde(rename = "type")]
    pub finding_type: String,
    pub severity: Severity,
    pub message: String,
    pub location: CellLocation,
    pub original_text: String,
    pub rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_range: Option<HighlightRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marked_text: Option<String>,
}

/// Character span `[start, end)` inside a cell's text, counted in chars.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct HighlightRange {
    pub start: usize,
    pub end: usize,
}

impl HighlightRange {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Check `0 <= start <= end <= len`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidRange` if the span does not fit.
    pub fn check(self, len: usize) -> Result<(), CoreError> {
        if self.start <= self.end && self.end <= len {
            Ok(())
        } else {
            Err(CoreError::InvalidRange {
                start: self.start,
                end: self.end,
                len,
            })
        }
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }
}

impl Finding {
    /// Attach a highlight span and derive `markedText` and the surrounding
    /// context from `original_text`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidRange` and leaves the finding untouched when
    /// the span does not fit the text.
    pub fn attach_highlight(&mut self, range: HighlightRange) -> Result<(), CoreError> {
        let marked = highlight::mark(&self.original_text, range, self.severity)?;
        let (before, after) =
            highlight::context_around(&self.original_text, range, highlight::CONTEXT_CHARS);
        self.highlight_range = Some(range);
        self.marked_text = Some(marked);
        self.context_before = Some(before);
        self.context_after = Some(after);
        Ok(())
    }
}
