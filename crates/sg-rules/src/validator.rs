//! Validator descriptors.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use sg_core::entities::{CellLocation, HighlightRange};
use sg_core::enums::Severity;

use crate::error::RuleError;

/// Signature every rule implements: pure over one cell's text and location.
pub type ValidatorFn =
    Arc<dyn Fn(&str, &CellLocation) -> Result<Vec<RuleFinding>, RuleError> + Send + Sync>;

/// What a rule reports for a cell. The orchestrator adds the id, location,
/// original text, context, and marked text.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFinding {
    pub finding_type: String,
    pub severity: Severity,
    pub message: String,
    pub confidence: Option<f64>,
    pub suggestion: Option<String>,
    pub highlight: Option<HighlightRange>,
}

impl RuleFinding {
    pub fn new(finding_type: &str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            finding_type: finding_type.to_string(),
            severity,
            message: message.into(),
            confidence: None,
            suggestion: None,
            highlight: None,
        }
    }

    #[must_use]
    pub const fn with_highlight(mut self, start: usize, end: usize) -> Self {
        self.highlight = Some(HighlightRange::new(start, end));
        self
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    #[must_use]
    pub const fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// A registered rule: a name, an optional category scope, and the function.
#[derive(Clone)]
pub struct ValidatorDescriptor {
    pub name: String,
    pub description: String,
    /// `None` runs on every file; `Some(c)` only on files classified as `c`.
    pub category: Option<String>,
    run: ValidatorFn,
}

impl ValidatorDescriptor {
    /// A rule applied to every cell regardless of category.
    pub fn global<F>(name: &str, description: &str, run: F) -> Self
    where
        F: Fn(&str, &CellLocation) -> Result<Vec<RuleFinding>, RuleError> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            category: None,
            run: Arc::new(run),
        }
    }

    /// A rule applied only to files of `category`.
    pub fn scoped<F>(category: &str, name: &str, description: &str, run: F) -> Self
    where
        F: Fn(&str, &CellLocation) -> Result<Vec<RuleFinding>, RuleError> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            category: Some(category.to_string()),
            run: Arc::new(run),
        }
    }

    #[must_use]
    pub fn applies_to(&self, category: &str) -> bool {
        self.category.as_deref().is_none_or(|c| c == category)
    }

    /// Run the rule on one cell. A panic inside the rule is reported as
    /// [`RuleError::Panicked`] instead of unwinding into the caller.
    ///
    /// # Errors
    ///
    /// Returns the rule's own `RuleError`, or `RuleError::Panicked`.
    pub fn check(&self, text: &str, location: &CellLocation) -> Result<Vec<RuleFinding>, RuleError> {
        match catch_unwind(AssertUnwindSafe(|| (self.run)(text, location))) {
            Ok(outcome) => outcome,
            Err(payload) => Err(RuleError::Panicked {
                rule: self.name.clone(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

impl fmt::Debug for ValidatorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorDescriptor")
            .field("name", &self.name)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
