use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Personal task board: life admin, work and weekly recurring tasks.
/// Data defaults to ~/.taskboard/tasks.json.
#[derive(Parser)]
#[command(name = "tb", version, about = "Personal task board CLI")]
pub struct Cli {
    /// Path to the JSON data file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Path to the TOML config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}
