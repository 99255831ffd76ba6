//! CLI argument definitions.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "petrel")]
#[command(about = "Resource-safe controller synthesis for consumption MDPs")]
#[command(version)]
pub(crate) struct Cli {
    /// Path to the model file
    pub(crate) model: PathBuf,

    /// Capacity override (defaults to the model's `capacity` constant)
    #[arg(long)]
    pub(crate) capacity: Option<u32>,

    /// Write the report to this file instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,

    /// Output format: text | json
    #[arg(long, default_value = "text")]
    pub(crate) format: String,
}
