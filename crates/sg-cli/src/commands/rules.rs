use serde::Serialize;
use sg_config::SgConfig;
use sg_rules::ValidatorRegistry;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RulesArgs;
use crate::output::output;

#[derive(Debug, Serialize)]
pub struct RuleLine {
    pub name: String,
    /// `all` for rules that run on every category.
    pub scope: String,
    pub description: String,
}

/// Handle `sgc rules`.
pub fn handle(args: &RulesArgs, config: &SgConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let registry = ValidatorRegistry::with_builtin_rules(&config.rules);
    output(&list(&registry, args.category.as_deref()), flags.format)
}

fn list(registry: &ValidatorRegistry, category: Option<&str>) -> Vec<RuleLine> {
    registry
        .iter()
        .filter(|descriptor| category.is_none_or(|c| descriptor.applies_to(c)))
        .map(|descriptor| RuleLine {
            name: descriptor.name.clone(),
            scope: descriptor
                .category
                .clone()
                .unwrap_or_else(|| "all".to_string()),
            description: descriptor.description.clone(),
        })
        .collect()
}
