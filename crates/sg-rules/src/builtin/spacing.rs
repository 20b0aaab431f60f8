use sg_core::enums::Severity;

use super::replace_span;
use crate::validator::{RuleFinding, ValidatorDescriptor};

pub const CONSECUTIVE: &str = "spacing.consecutive";
pub const EDGES: &str = "spacing.edges";

fn is_space(c: char) -> bool {
    c == ' ' || c == '\u{3000}'
}

/// Runs of at least `threshold` spaces.
#[must_use]
pub fn consecutive(threshold: usize) -> ValidatorDescriptor {
    ValidatorDescriptor::global(
        CONSECUTIVE,
        "Flags runs of consecutive spaces at or above the configured threshold",
        move |text, _| {
            Ok(space_runs(text)
                .into_iter()
                .filter(|(start, end)| end - start >= threshold)
                .map(|(start, end)| {
                    RuleFinding::new(
                        "spacing",
                        Severity::Warning,
                        format!("연속된 공백 {}개", end - start),
                    )
                    .with_highlight(start, end)
                    .with_suggestion(replace_span(text, start, end, " "))
                })
                .collect())
        },
    )
}

/// Leading or trailing whitespace.
#[must_use]
pub fn edges() -> ValidatorDescriptor {
    ValidatorDescriptor::global(
        EDGES,
        "Flags whitespace before the first or after the last visible character",
        |text, _| {
            let len = text.chars().count();
            let leading = text.chars().take_while(|c| c.is_whitespace()).count();
            if leading == len {
                return Ok(vec![
                    RuleFinding::new("spacing", Severity::Info, "공백만 있는 셀")
                        .with_highlight(0, len)
                        .with_suggestion(""),
                ]);
            }
            let trailing = text.chars().rev().take_while(|c| c.is_whitespace()).count();
            let trimmed = text.trim().to_string();

            let mut findings = Vec::new();
            if leading > 0 {
                findings.push(
                    RuleFinding::new("spacing", Severity::Info, "앞쪽 공백")
                        .with_highlight(0, leading)
                        .with_suggestion(trimmed.clone()),
                );
            }
            if trailing > 0 {
                findings.push(
                    RuleFinding::new("spacing", Severity::Info, "뒤쪽 공백")
                        .with_highlight(len - trailing, len)
                        .with_suggestion(trimmed),
                );
            }
            Ok(findings)
        },
    )
}

/// Char spans of every maximal run of spaces.
fn space_runs(text: &str) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut run_start = None;
    for (index, c) in text.chars().enumerate() {
        match (is_space(c), run_start) {
            (true, None) => run_start = Some(index),
            (false, Some(start)) => {
                runs.push((start, index));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        runs.push((start, text.chars().count()));
    }
    runs
}
