//! Built-in rules for school-record text.
//!
//! None of these are normative; hosts can build a registry without them and
//! register their own descriptors instead.

pub mod attendance;
pub mod length;
pub mod punctuation;
pub mod spacing;
pub mod terms;

use sg_config::RulesConfig;

use crate::categories::{BEHAVIOR, SUBJECT_REMARKS};
use crate::validator::ValidatorDescriptor;

/// Every built-in descriptor, in the order findings should be reported.
#[must_use]
pub fn all(config: &RulesConfig) -> Vec<ValidatorDescriptor> {
    vec![
        terms::forbidden_terms(&config.forbidden_terms),
        spacing::consecutive(config.spacing_threshold),
        spacing::edges(),
        punctuation::repeated(),
        length::byte_limit(SUBJECT_REMARKS, config.byte_limit),
        length::byte_limit(BEHAVIOR, config.byte_limit),
        attendance::day_counts(),
    ]
}

/// Char offset of byte offset `byte` in `text`.
pub(crate) fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

/// `text` with the char span `[start, end)` replaced by `with`.
pub(crate) fn replace_span(text: &str, start: usize, end: usize, with: &str) -> String {
    let mut out: String = text.chars().take(start).collect();
    out.push_str(with);
    out.extend(text.chars().skip(end));
    out
}
