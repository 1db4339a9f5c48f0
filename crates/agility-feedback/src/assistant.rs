// assistant.rs - Generation and feedback flows.
//
// Each flow is: build prompt -> one model call -> parse -> stage the result
// on tickets. Nothing here approves anything; decisions stay with the
// `ApprovalHandler` caller.

use agility_ticket::{ApprovalHandler, Epic, IdAllocator, Issue, Ticket, TicketId};
use serde::Serialize;

use crate::apply::{apply_issue_feedback, AppliedFeedback};
use crate::error::Result;
use crate::model::CompletionModel;
use crate::parser::{parse_epic_feedback, parse_issue_feedback};
use crate::prompts;

/// Outcome of [`Assistant::issue_feedback`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueFeedbackOutcome {
    pub applied: AppliedFeedback,
    pub proposal_summary: String,
}

/// Runs the ticket flows against a completion model.
pub struct Assistant<M> {
    model: M,
}

impl<M: CompletionModel> Assistant<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Draft a new epic from a free-form description.
    ///
    /// The epic is created APPROVED with the next id from `ids`; the summary
    /// explains how the model arrived at it.
    pub fn generate_epic(
        &self,
        user_prompt: &str,
        ids: &mut IdAllocator,
    ) -> Result<(Epic, String)> {
        let raw = self
            .model
            .complete(prompts::SYSTEM_PROMPT, &prompts::generate_epic(user_prompt))?;
        let (epic, summary) = parse_epic_feedback(&raw).into_epic(ids);
        tracing::info!(epic_id = %epic.id(), "generated epic");
        Ok((epic, summary))
    }

    /// Propose a revision of `epic` from reviewer feedback.
    ///
    /// On success the epic is in UPDATE state with the proposal staged,
    /// unless the model produced no epic text. Returns the changes summary.
    pub fn epic_feedback(
        &self,
        epic: &mut Epic,
        feedback: &str,
        project_summary: &str,
    ) -> Result<String> {
        let prompt = prompts::epic_feedback(epic, feedback, project_summary);
        let raw = self.model.complete(prompts::SYSTEM_PROMPT, &prompt)?;
        let parsed = parse_epic_feedback(&raw);
        if parsed.propose_onto(epic) {
            tracing::info!(epic_id = %epic.id(), "proposed epic update");
        }
        Ok(parsed.summary)
    }

    /// Ask for changes to the issues registered in `handler` and stage them.
    ///
    /// Updates and deletes become proposals on the registered issues; new
    /// issues are registered as ADD tickets linked to `epic_id`.
    pub fn issue_feedback(
        &self,
        handler: &mut ApprovalHandler,
        feedback: &str,
        ids: &mut IdAllocator,
        epic_id: Option<TicketId>,
    ) -> Result<IssueFeedbackOutcome> {
        let issues = handler.tickets().filter_map(Ticket::as_issue);
        let prompt = prompts::issue_feedback(issues, feedback);
        let raw = self.model.complete(prompts::SYSTEM_PROMPT, &prompt)?;
        let parsed = parse_issue_feedback(&raw);
        let applied = apply_issue_feedback(handler, &parsed, ids, epic_id)?;
        Ok(IssueFeedbackOutcome {
            applied,
            proposal_summary: parsed.proposal_summary,
        })
    }

    /// Break `epic` into new issues.
    ///
    /// Returns ADD issues linked to the epic, ready for `add_ticket`, plus
    /// the model's summary. Blocks addressing existing issues are ignored.
    pub fn generate_issues(
        &self,
        epic: &Epic,
        repository_context: Option<&str>,
        ids: &mut IdAllocator,
    ) -> Result<(Vec<Issue>, String)> {
        let prompt = prompts::generate_issues(epic, repository_context);
        let raw = self.model.complete(prompts::SYSTEM_PROMPT, &prompt)?;
        let parsed = parse_issue_feedback(&raw);

        if !parsed.modifications.is_empty() {
            tracing::warn!(
                count = parsed.modifications.len(),
                "ignoring existing-issue blocks in issue generation output"
            );
        }

        let issues: Vec<Issue> = parsed
            .new_proposals
            .iter()
            .filter_map(|proposal| proposal.to_new_issue(ids, Some(epic.id())))
            .collect();
        tracing::info!(epic_id = %epic.id(), count = issues.len(), "generated issues");
        Ok((issues, parsed.proposal_summary))
    }
}
