//! Severity-tagged highlight markers.
//!
//! A marked text is the original cell text with one `[start, end)` char span
//! wrapped as `<mark data-severity="warning">…</mark>`. Everything outside the
//! span is byte-identical to the original, so [`strip_marker`] recovers the
//! original exactly from the marked text, the range, and the severity.

use crate::entities::HighlightRange;
use crate::enums::Severity;
use crate::errors::CoreError;

/// Chars of context kept on each side of a highlighted span.
pub const CONTEXT_CHARS: usize = 20;

const MARK_CLOSE: &str = "</mark>";

/// Opening tag for a given severity.
#[must_use]
pub fn open_tag(severity: Severity) -> String {
    format!("<mark data-severity=\"{severity}\">")
}

/// Wrap `range` of `text` in a severity-tagged marker.
///
/// # Errors
///
/// Returns `CoreError::InvalidRange` if the range does not fit the text.
pub fn mark(text: &str, range: HighlightRange, severity: Severity) -> Result<String, CoreError> {
    range.check(text.chars().count())?;
    let start = byte_offset(text, range.start);
    let end = byte_offset(text, range.end);
    let open = open_tag(severity);

    let mut out = String::with_capacity(text.len() + open.len() + MARK_CLOSE.len());
    out.push_str(&text[..start]);
    out.push_str(&open);
    out.push_str(&text[start..end]);
    out.push_str(MARK_CLOSE);
    out.push_str(&text[end..]);
    Ok(out)
}

/// Remove the marker injected by [`mark`], returning the original text.
///
/// Returns `None` when `marked` does not carry a marker for `range` and
/// `severity` at the expected position.
#[must_use]
pub fn strip_marker(marked: &str, range: HighlightRange, severity: Severity) -> Option<String> {
    let open = open_tag(severity);
    let open_at = checked_byte_offset(marked, range.start)?;
    let rest = marked[open_at..].strip_prefix(open.as_str())?;
    let span_end = checked_byte_offset(rest, range.len())?;
    let after = rest[span_end..].strip_prefix(MARK_CLOSE)?;

    let mut out = String::with_capacity(marked.len());
    out.push_str(&marked[..open_at]);
    out.push_str(&rest[..span_end]);
    out.push_str(after);
    Some(out)
}

/// Up to `width` chars before and after `range`.
///
/// The range must already be valid for `text`.
#[must_use]
pub fn context_around(text: &str, range: HighlightRange, width: usize) -> (String, String) {
    let before_start = range.start.saturating_sub(width);
    let before = text
        .chars()
        .skip(before_start)
        .take(range.start - before_start)
        .collect();
    let after = text.chars().skip(range.end).take(width).collect();
    (before, after)
}

/// Char offset to byte offset. Offsets past the end map to `text.len()`.
fn byte_offset(text: &str, char_offset: usize) -> usize {
    checked_byte_offset(text, char_offset).unwrap_or(text.len())
}

fn checked_byte_offset(text: &str, char_offset: usize) -> Option<usize> {
    if char_offset == 0 {
        return Some(0);
    }
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .nth(char_offset)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn marks_korean_text_by_char_offsets() {
        let text = "학생은     매우 잘 참여함";
        let marked = mark(text, HighlightRange::new(3, 8), Severity::Warning).unwrap();
        assert_eq!(
            marked,
            "학생은<mark data-severity=\"warning\">     </mark>매우 잘 참여함"
        );
    }

    #[rstest]
    #[case("학생은     매우 잘 참여함", 3, 8, Severity::Warning)]
    #[case("abc", 0, 0, Severity::Info)]
    #[case("abc", 0, 3, Severity::Error)]
    #[case("끝까지..", 3, 5, Severity::Warning)]
    #[case("<mark data-severity=\"error\">x</mark>", 2, 6, Severity::Error)]
    fn strip_marker_round_trips(
        #[case] text: &str,
        #[case] start: usize,
        #[case] end: usize,
        #[case] severity: Severity,
    ) {
        let range = HighlightRange::new(start, end);
        let marked = mark(text, range, severity).unwrap();
        assert_eq!(strip_marker(&marked, range, severity).as_deref(), Some(text));
    }

    #[test]
    fn strip_marker_rejects_wrong_severity() {
        let range = HighlightRange::new(0, 1);
        let marked = mark("ab", range, Severity::Error).unwrap();
        assert_eq!(strip_marker(&marked, range, Severity::Info), None);
    }

    #[test]
    fn mark_rejects_out_of_range() {
        let err = mark("abc", HighlightRange::new(2, 4), Severity::Info).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRange { len: 3, .. }));
        assert!(mark("abc", HighlightRange::new(2, 1), Severity::Info).is_err());
    }

    #[test]
    fn context_is_bounded_by_width() {
        let text = "0123456789abcdefghij";
        let (before, after) = context_around(text, HighlightRange::new(10, 12), 3);
        assert_eq!(before, "789");
        assert_eq!(after, "cde");

        let (before, after) = context_around(text, HighlightRange::new(1, 19), 5);
        assert_eq!(before, "0");
        assert_eq!(after, "j");
    }
}
