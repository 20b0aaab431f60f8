use sg_core::enums::Severity;

use super::char_offset;
use crate::validator::{RuleFinding, ValidatorDescriptor};

pub const FORBIDDEN_TERMS: &str = "content.forbidden_terms";

/// Terms that may not appear in a school record: external exam scores,
/// overseas programs, papers and patents, parental background.
pub const BUILTIN_TERMS: &[&str] = &[
    "토익",
    "TOEIC",
    "토플",
    "TOEFL",
    "텝스",
    "TEPS",
    "HSK",
    "JLPT",
    "어학연수",
    "해외봉사",
    "교외수상",
    "소논문",
    "특허",
    "부모의 직업",
];

/// Occurrences of any forbidden term. ASCII terms match case-insensitively.
#[must_use]
pub fn forbidden_terms(extra: &[String]) -> ValidatorDescriptor {
    let terms: Vec<String> = BUILTIN_TERMS
        .iter()
        .map(|t| (*t).to_string())
        .chain(extra.iter().filter(|t| !t.is_empty()).cloned())
        .collect();

    ValidatorDescriptor::global(
        FORBIDDEN_TERMS,
        "Flags terms that school-record guidelines do not allow",
        move |text, _| {
            let haystack = text.to_ascii_lowercase();
            let mut hits: Vec<(usize, usize, &str)> = Vec::new();
            for term in &terms {
                let needle = term.to_ascii_lowercase();
                for (byte, matched) in haystack.match_indices(&needle) {
                    let start = char_offset(text, byte);
                    let end = start + matched.chars().count();
                    hits.push((start, end, term.as_str()));
                }
            }
            hits.sort_by_key(|(start, end, _)| (*start, *end));
            Ok(hits
                .into_iter()
                .map(|(start, end, term)| {
                    RuleFinding::new(
                        "forbidden_term",
                        Severity::Error,
                        format!("기재 금지 항목: {term}"),
                    )
                    .with_highlight(start, end)
                })
                .collect())
        },
    )
}
