//! CLI command definitions
//!
//! Defines the clap commands for the regression harness.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::report::ColorChoice;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the regression scenarios against the target binary
    Run(RunArgs),

    /// List the scenarios a run would execute, in order
    List(ScenarioArgs),
}

/// Options selecting which scenarios run
#[derive(Args, Debug, Default)]
pub struct ScenarioArgs {
    /// Configuration file (default: ./db-regress.toml, then the user config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// YAML scenario suite; repeatable, replaces the built-in scenarios
    #[arg(long = "file", short = 'f')]
    pub files: Vec<PathBuf>,

    /// Database name for the built-in scenarios
    #[arg(long)]
    pub name: Option<String>,

    /// Database directory for the built-in scenarios
    #[arg(long)]
    pub directory: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub scenarios: ScenarioArgs,

    /// Target binary (default: target/debug/cli, or $DB_REGRESS_BIN)
    #[arg(long)]
    pub binary: Option<PathBuf>,

    /// Per-invocation timeout in seconds, 0 waits indefinitely
    #[arg(long)]
    pub timeout: Option<u64>,

    /// When to colorize report lines
    #[arg(long, value_enum)]
    pub color: Option<ColorChoice>,
}
