//! # agility-cli
//!
//! Command-line interface for Agility.
//!
//! - `agility parse epic|issues` - parse saved model output offline
//! - `agility epic generate/feedback` - draft or revise an epic
//! - `agility issue generate/feedback` - break an epic into issues, revise issues
//!
//! Results are printed to stdout as JSON in the flat record shapes; logs go
//! to stderr.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::Context;

/// Agility - LLM-assisted epics and issues with human approval.
#[derive(Parser)]
#[command(name = "agility", version, about)]
struct Cli {
    /// Project root directory (defaults to current directory).
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse saved model output without calling a model.
    Parse {
        #[command(subcommand)]
        command: commands::parse::ParseCommands,
    },
    /// Generate or revise an epic.
    Epic {
        #[command(subcommand)]
        command: commands::epic::EpicCommands,
    },
    /// Generate or revise issues.
    Issue {
        #[command(subcommand)]
        command: commands::issue::IssueCommands,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("agility_ticket=info".parse()?)
                .add_directive("agility_feedback=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let project_root = cli.project_root.canonicalize().unwrap_or(cli.project_root);
    let ctx = Context::for_project(&project_root);

    match &cli.command {
        Commands::Parse { command } => commands::parse::execute(command),
        Commands::Epic { command } => commands::epic::execute(command, &ctx),
        Commands::Issue { command } => commands::issue::execute(command, &ctx),
    }
}
