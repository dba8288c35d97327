use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Exit codes: 0 success, 1 configuration error, 2 runtime error.
pub const EXIT_OK: i32 = 0;
pub const EXIT_CONFIG_ERROR: i32 = 1;
pub const EXIT_RUNTIME_ERROR: i32 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "rowforge",
    about = "Generate synthetic tabular datasets from declarative configs",
    version,
    after_help = "Examples:\n  rowforge generate --config orders.json\n  rowforge generate --config orders.yaml --stream queue.yaml\n  rowforge generate --config orders.json --batch batches.json --perf\n  rowforge validate --config orders.json\n  rowforge strategies --describe\n  rowforge preview --config orders.json --rows 10"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a generation config and deliver the dataset
    Generate(GenerateArgs),

    /// Validate a config without generating anything
    Validate(ValidateArgs),

    /// List available strategies and their parameter schemas
    Strategies(StrategiesArgs),

    /// Generate a handful of rows and print them as a table
    Preview(PreviewArgs),
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Generation config (JSON or YAML)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Streaming side config: deliver chunks to a message queue
    #[arg(long, conflicts_with = "batch")]
    pub stream: Option<PathBuf>,

    /// Batch side config: deliver one file per chunk
    #[arg(long, conflicts_with = "stream")]
    pub batch: Option<PathBuf>,

    /// Include a performance report in the summary
    #[arg(long)]
    pub perf: bool,

    /// Print the full run summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Generation config (JSON or YAML)
    #[arg(short, long)]
    pub config: PathBuf,
}

#[derive(Parser, Debug)]
pub struct StrategiesArgs {
    /// Print full parameter schemas as JSON instead of the name table
    #[arg(long)]
    pub describe: bool,
}

#[derive(Parser, Debug)]
pub struct PreviewArgs {
    /// Generation config (JSON or YAML)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Number of sample rows to generate
    #[arg(long, default_value = "5")]
    pub rows: usize,
}
