//! Entity structs for the saenggi exchange contract.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema`. Field names
//! serialize as camelCase because the shapes are consumed by the upload UI and
//! by programmatic report readers.

mod category;
mod document;
mod file;
mod finding;
mod result;
mod session;
mod status;

pub use category::{CategorySummary, summarize_categories};
pub use document::{CellLocation, Document, Sheet, column_letter};
pub use file::{ClassificationMetadata, FileRecord, GENERIC_CATEGORY, clamp_confidence};
pub use finding::{Finding, HighlightRange};
pub use result::{ValidationResult, ValidationSummary};
pub use session::Session;
pub use status::{RunSummary, SessionValidationStatus};
