// epic.rs - Epic subcommands: generate, feedback.

use agility_ticket::{Epic, EpicRecord, IdAllocator};
use clap::Subcommand;
use serde::Serialize;

use super::{print_json, read_json_arg, require_text, Context};

#[derive(Subcommand)]
pub enum EpicCommands {
    /// Draft a new epic from a description.
    Generate {
        /// What the project should achieve.
        prompt: String,
        /// Id to give the new epic.
        #[arg(long, default_value = "0")]
        id: u64,
    },
    /// Propose a revision of an epic from reviewer feedback.
    Feedback {
        /// Epic as flat JSON ({epic_id, epic_content}), or @file.
        #[arg(long)]
        epic: String,
        /// Reviewer feedback.
        #[arg(long)]
        feedback: String,
        /// Project details and status given to the model.
        #[arg(long, default_value = "")]
        project_summary: String,
    },
}

#[derive(Debug, Serialize)]
struct GeneratedEpic {
    epic: EpicRecord,
    summary: String,
}

#[derive(Debug, Serialize)]
struct EpicFeedbackOutput {
    updated_epic: EpicRecord,
    changes_summary: String,
}

pub fn execute(cmd: &EpicCommands, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        EpicCommands::Generate { prompt, id } => {
            require_text(prompt, "prompt")?;
            let assistant = ctx.assistant()?;
            let mut ids = IdAllocator::starting_at(*id);
            let (epic, summary) = assistant.generate_epic(prompt, &mut ids)?;
            print_json(&GeneratedEpic {
                epic: EpicRecord::from(&epic),
                summary,
            })
        }

        EpicCommands::Feedback {
            epic,
            feedback,
            project_summary,
        } => {
            require_text(feedback, "feedback")?;
            let record: EpicRecord = read_json_arg(epic, "epic")?;
            let mut epic = Epic::from(record);
            let assistant = ctx.assistant()?;
            let changes_summary = assistant.epic_feedback(&mut epic, feedback, project_summary)?;
            print_json(&EpicFeedbackOutput {
                updated_epic: EpicRecord::from(&epic),
                changes_summary,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agility_ticket::TicketId;

    #[test]
    fn feedback_output_shape() {
        let mut epic = Epic::new(TicketId(1), "old");
        epic.propose_update("new");
        let json = serde_json::to_value(EpicFeedbackOutput {
            updated_epic: EpicRecord::from(&epic),
            changes_summary: "why".into(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "updated_epic": {"epic_id": 1, "epic_content": "old", "proposed_content": "new"},
                "changes_summary": "why"
            })
        );
    }
}
