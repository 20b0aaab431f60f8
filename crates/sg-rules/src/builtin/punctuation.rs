use sg_core::enums::Severity;

use super::replace_span;
use crate::validator::{RuleFinding, ValidatorDescriptor};

pub const REPEATED: &str = "punctuation.repeated";

const WATCHED: [char; 5] = ['.', ',', '!', '?', '~'];

/// Repeated punctuation (`..`, `!!`, `??`). A three-dot ellipsis is allowed.
#[must_use]
pub fn repeated() -> ValidatorDescriptor {
    ValidatorDescriptor::global(
        REPEATED,
        "Flags doubled punctuation marks other than a three-dot ellipsis",
        |text, _| {
            let chars: Vec<char> = text.chars().collect();
            let mut findings = Vec::new();
            let mut i = 0;
            while i < chars.len() {
                let c = chars[i];
                let mut j = i + 1;
                while j < chars.len() && chars[j] == c {
                    j += 1;
                }
                let run = j - i;
                let ellipsis = c == '.' && run == 3;
                if WATCHED.contains(&c) && run >= 2 && !ellipsis {
                    findings.push(
                        RuleFinding::new(
                            "punctuation",
                            Severity::Warning,
                            format!("문장부호 '{c}' {run}회 반복"),
                        )
                        .with_highlight(i, j)
                        .with_suggestion(replace_span(text, i, j, &c.to_string())),
                    );
                }
                i = j;
            }
            Ok(findings)
        },
    )
}
