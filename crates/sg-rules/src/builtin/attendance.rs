use sg_core::enums::Severity;

use crate::categories::ATTENDANCE;
use crate::validator::{RuleFinding, ValidatorDescriptor};

pub const DAY_COUNTS: &str = "attendance.day_counts";

/// Numeric cells in attendance exports count days, so they must be whole and
/// non-negative.
#[must_use]
pub fn day_counts() -> ValidatorDescriptor {
    ValidatorDescriptor::scoped(
        ATTENDANCE,
        DAY_COUNTS,
        "Flags negative or fractional day counts in attendance sheets",
        |text, _| {
            let trimmed = text.trim();
            let Ok(value) = trimmed.parse::<f64>() else {
                return Ok(Vec::new());
            };
            if value >= 0.0 && value.fract() == 0.0 {
                return Ok(Vec::new());
            }

            let start = text.chars().take_while(|c| c.is_whitespace()).count();
            let end = start + trimmed.chars().count();
            Ok(vec![
                RuleFinding::new(
                    "attendance",
                    Severity::Error,
                    format!("출결 일수는 0 이상의 정수여야 함: {trimmed}"),
                )
                .with_highlight(start, end),
            ])
        },
    )
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use sg_core::entities::CellLocation;

    use super::*;

    #[rstest]
    #[case("3", false)]
    #[case("0", false)]
    #[case("-1", true)]
    #[case("2.5", true)]
    #[case("질병 결석 3일", false)]
    #[case(".", false)]
    fn checks_day_counts(#[case] text: &str, #[case] flagged: bool) {
        let findings = day_counts().check(text, &CellLocation::new("출결", 2, 4)).unwrap();
        assert_eq!(!findings.is_empty(), flagged);
    }
}
