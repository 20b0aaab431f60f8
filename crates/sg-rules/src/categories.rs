//! Category labels understood by the built-in classifier and rules.
//!
//! Any other label is still a valid category; it simply receives only the
//! global rules.

pub const ATTENDANCE: &str = "attendance";
pub const SUBJECT_REMARKS: &str = "subject_remarks";
pub const BEHAVIOR: &str = "behavior";
pub const ACTIVITIES: &str = "activities";

pub use sg_core::entities::GENERIC_CATEGORY as GENERIC;
