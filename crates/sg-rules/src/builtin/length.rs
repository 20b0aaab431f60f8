use sg_core::enums::Severity;

use crate::validator::{RuleFinding, ValidatorDescriptor};

pub const BYTE_LIMIT: &str = "length.byte_limit";

/// Byte length as counted by NEIS: Hangul and other non-ASCII chars take 3
/// bytes, a line break takes 2, ASCII takes 1.
#[must_use]
pub fn neis_bytes(text: &str) -> usize {
    text.chars().map(neis_char_bytes).sum()
}

const fn neis_char_bytes(c: char) -> usize {
    if c == '\n' {
        2
    } else if c.is_ascii() {
        1
    } else {
        3
    }
}

/// Free-text cells of `category` longer than `limit` NEIS bytes. The
/// highlight starts at the first char past the limit.
#[must_use]
pub fn byte_limit(category: &str, limit: usize) -> ValidatorDescriptor {
    ValidatorDescriptor::scoped(
        category,
        BYTE_LIMIT,
        "Flags remark cells exceeding the NEIS byte limit",
        move |text, _| {
            let total = neis_bytes(text);
            if total <= limit {
                return Ok(Vec::new());
            }

            let mut used = 0;
            let mut overflow_at = 0;
            for (index, c) in text.chars().enumerate() {
                used += neis_char_bytes(c);
                if used > limit {
                    overflow_at = index;
                    break;
                }
            }
            let len = text.chars().count();
            Ok(vec![
                RuleFinding::new(
                    "length",
                    Severity::Error,
                    format!("{total}바이트로 최대 {limit}바이트를 초과함"),
                )
                .with_highlight(overflow_at, len),
            ])
        },
    )
}
