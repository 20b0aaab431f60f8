use schemars::{Schema, schema_for};
use sg_core::entities::{Finding, Session, SessionValidationStatus, ValidationResult};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{SchemaArgs, SchemaType};
use crate::output::output;

/// Handle `sgc schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&schema(args.type_name), flags.format)
}

fn schema(type_name: SchemaType) -> Schema {
    match type_name {
        SchemaType::Finding => schema_for!(Finding),
        SchemaType::Result => schema_for!(ValidationResult),
        SchemaType::Status => schema_for!(SessionValidationStatus),
        SchemaType::Session => schema_for!(Session),
    }
}
