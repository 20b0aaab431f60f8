//! Validator registry.
//!
//! Descriptors are kept in registration order. Resolution for a category keeps
//! that order, which is the order findings within one cell are reported in.

use sg_config::RulesConfig;

use crate::builtin;
use crate::error::RuleError;
use crate::validator::ValidatorDescriptor;

#[derive(Debug, Clone, Default)]
pub struct ValidatorRegistry {
    validators: Vec<ValidatorDescriptor>,
}

impl ValidatorRegistry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    /// Registry preloaded with the built-in rule set.
    #[must_use]
    pub fn with_builtin_rules(config: &RulesConfig) -> Self {
        let mut registry = Self::new();
        for descriptor in builtin::all(config) {
            registry.validators.push(descriptor);
        }
        registry
    }

    /// Append a validator.
    ///
    /// # Errors
    ///
    /// Returns `RuleError::Failed` if a validator with the same name and scope
    /// is already registered.
    pub fn register(&mut self, descriptor: ValidatorDescriptor) -> Result<(), RuleError> {
        let duplicate = self
            .validators
            .iter()
            .any(|v| v.name == descriptor.name && v.category == descriptor.category);
        if duplicate {
            return Err(RuleError::failed(
                &descriptor.name,
                format!(
                    "already registered for scope {}",
                    descriptor.category.as_deref().unwrap_or("global")
                ),
            ));
        }
        tracing::debug!(
            rule = %descriptor.name,
            scope = descriptor.category.as_deref().unwrap_or("global"),
            "registered validator"
        );
        self.validators.push(descriptor);
        Ok(())
    }

    /// Validators that apply to files of `category`, in registration order.
    #[must_use]
    pub fn resolve(&self, category: &str) -> Vec<ValidatorDescriptor> {
        self.validators
            .iter()
            .filter(|v| v.applies_to(category))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidatorDescriptor> {
        self.validators.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}
