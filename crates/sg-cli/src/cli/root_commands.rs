use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use sg_core::enums::ExportFormat;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Classify and validate documents, optionally exporting a report.
    Check(CheckArgs),
    /// Classify documents without validating them.
    Classify(ClassifyArgs),
    /// List registered validators.
    Rules(RulesArgs),
    /// Print the JSON schema of an exchange type.
    Schema(SchemaArgs),
}

#[derive(Clone, Debug, Args)]
pub struct CheckArgs {
    /// Documents to check (`.json` documents or `.csv` sheets).
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Only validate files classified into these categories.
    #[arg(short, long = "category")]
    pub categories: Vec<String>,

    /// Run in the background and poll for progress.
    #[arg(long = "async")]
    pub run_async: bool,

    /// Write a report in this format.
    #[arg(short, long)]
    pub export: Option<ExportArg>,

    /// Merge all results into one report file.
    #[arg(long, requires = "export")]
    pub merge: bool,

    /// Report directory (defaults to `report.output_dir`).
    #[arg(short, long, requires = "export")]
    pub out: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct ClassifyArgs {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct RulesArgs {
    /// Only rules that run on this category.
    #[arg(short, long)]
    pub category: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    #[arg(value_enum)]
    pub type_name: SchemaType,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportArg {
    Excel,
    Csv,
    Json,
    Zip,
}

impl From<ExportArg> for ExportFormat {
    fn from(value: ExportArg) -> Self {
        match value {
            ExportArg::Excel => Self::Excel,
            ExportArg::Csv => Self::Csv,
            ExportArg::Json => Self::Json,
            ExportArg::Zip => Self::Zip,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SchemaType {
    Finding,
    Result,
    Status,
    Session,
}
