// issue.rs - Issue subcommands: generate, feedback.

use std::path::PathBuf;

use agility_ticket::{
    ApprovalHandler, Epic, EpicRecord, IdAllocator, Issue, IssueRecord, Ticket, TicketId,
};
use anyhow::Context as _;
use clap::Subcommand;
use serde::Serialize;

use super::{print_json, read_json_arg, require_text, Context};

#[derive(Subcommand)]
pub enum IssueCommands {
    /// Break an epic into new issues.
    Generate {
        /// Epic as flat JSON ({epic_id, epic_content}), or @file.
        #[arg(long)]
        epic: String,
        /// File with repository context for the model.
        #[arg(long)]
        context_file: Option<PathBuf>,
        /// Id of the first generated issue.
        #[arg(long, default_value = "1")]
        first_id: u64,
    },
    /// Propose updates, deletions and additions from reviewer feedback.
    Feedback {
        /// Issues as a flat JSON array ([{issue_id, issue_title, issue_body}]), or @file.
        #[arg(long)]
        issues: String,
        /// Reviewer feedback.
        #[arg(long)]
        feedback: String,
        /// Epic the issues belong to; new issues are linked to it.
        #[arg(long)]
        epic_id: Option<u64>,
    },
}

#[derive(Debug, Serialize)]
struct GeneratedIssues {
    issues: Vec<IssueRecord>,
    summary: String,
}

#[derive(Debug, Serialize)]
struct IssueFeedbackOutput {
    updated_issues: Vec<IssueRecord>,
    proposal_summary: String,
}

pub fn execute(cmd: &IssueCommands, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        IssueCommands::Generate {
            epic,
            context_file,
            first_id,
        } => {
            let record: EpicRecord = read_json_arg(epic, "epic")?;
            let epic = Epic::from(record);
            let repository_context = context_file
                .as_ref()
                .map(|path| {
                    std::fs::read_to_string(path)
                        .with_context(|| format!("failed to read {}", path.display()))
                })
                .transpose()?;

            let assistant = ctx.assistant()?;
            let mut ids = IdAllocator::starting_at(*first_id);
            let (issues, summary) =
                assistant.generate_issues(&epic, repository_context.as_deref(), &mut ids)?;
            print_json(&GeneratedIssues {
                issues: issues.iter().map(IssueRecord::from).collect(),
                summary,
            })
        }

        IssueCommands::Feedback {
            issues,
            feedback,
            epic_id,
        } => {
            let records: Vec<IssueRecord> = read_json_arg(issues, "issues")?;
            check_feedback_input(feedback, &records)?;
            let mut handler = ctx.handler();
            register(&mut handler, records)?;
            let mut ids = IdAllocator::after(handler.ids());

            let assistant = ctx.assistant()?;
            let epic_id = epic_id.map(TicketId);
            let outcome = assistant.issue_feedback(&mut handler, feedback, &mut ids, epic_id)?;
            print_json(&IssueFeedbackOutput {
                updated_issues: issue_records(&handler),
                proposal_summary: outcome.proposal_summary,
            })
        }
    }
}

fn check_feedback_input(feedback: &str, records: &[IssueRecord]) -> anyhow::Result<()> {
    require_text(feedback, "feedback")?;
    if records.is_empty() {
        anyhow::bail!("issues must not be empty");
    }
    Ok(())
}

fn register(handler: &mut ApprovalHandler, records: Vec<IssueRecord>) -> anyhow::Result<()> {
    for record in records {
        let id = record.issue_id;
        let issue = Issue::try_from(record)?;
        handler
            .add_ticket(issue)
            .with_context(|| format!("issue {id} listed twice"))?;
    }
    Ok(())
}

/// Every issue in the handler, registered and new, ordered by id.
fn issue_records(handler: &ApprovalHandler) -> Vec<IssueRecord> {
    let mut records: Vec<IssueRecord> = handler
        .tickets()
        .filter_map(Ticket::as_issue)
        .chain(handler.new_tickets())
        .map(IssueRecord::from)
        .collect();
    records.sort_by_key(|record| record.issue_id);
    records
}
