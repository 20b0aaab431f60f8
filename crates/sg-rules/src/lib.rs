//! # sg-rules
//!
//! The contract rule validators satisfy to plug into the orchestrator, the
//! registry that resolves them per file category, a set of built-in rules for
//! school-record text, and the document classifier contract.
//!
//! Validators are plain descriptors (`name`, optional category, `run`
//! function) rather than trait objects in an inheritance tree. A descriptor
//! with no category runs on every cell of every file.

pub mod builtin;
pub mod categories;
pub mod classifier;
pub mod error;
pub mod registry;
pub mod validator;

pub use classifier::{Classification, Classifier, KeywordClassifier};
pub use error::{ClassifyError, RuleError};
pub use registry::ValidatorRegistry;
pub use validator::{RuleFinding, ValidatorDescriptor, ValidatorFn};
