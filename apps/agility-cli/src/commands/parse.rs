// parse.rs - Offline parse of saved model output.

use std::path::PathBuf;

use agility_feedback::{parse_epic_feedback, parse_issue_feedback};
use clap::Subcommand;

use super::{print_json, read_input};

#[derive(Subcommand)]
pub enum ParseCommands {
    /// Parse epic output (Epic:/Summary: blocks).
    Epic {
        /// File with the model output (defaults to stdin).
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Parse issue output (Issue N:/New Issue:/Proposal Summary: blocks).
    Issues {
        /// File with the model output (defaults to stdin).
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

pub fn execute(cmd: &ParseCommands) -> anyhow::Result<()> {
    match cmd {
        ParseCommands::Epic { file } => {
            let raw = read_input(file.as_deref())?;
            print_json(&parse_epic_feedback(&raw))
        }
        ParseCommands::Issues { file } => {
            let raw = read_input(file.as_deref())?;
            print_json(&parse_issue_feedback(&raw))
        }
    }
}
