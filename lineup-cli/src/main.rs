//! Lineup CLI - Command-line interface
//!
//! Runs schedule queries against a JSON fixture served from memory.

mod commands;

use std::path::PathBuf;

use clap::Parser;
use lineup_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "lineup")]
#[command(about = "Channel schedule resolution and override merging")]
struct Cli {
    /// Console log level; the run log always records everything
    #[arg(long, value_enum, default_value_t = CliLogLevel::Warn, global = true)]
    log_level: CliLogLevel,

    /// Directory for the per-run log file
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level(), cli.logs_dir.as_deref())?;

    commands::handle_command(cli.command).await
}
