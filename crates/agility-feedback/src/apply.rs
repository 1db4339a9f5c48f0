// apply.rs - Apply parsed issue feedback onto registered tickets.
//
// Modifications address issues already registered with the handler
// (`issue_{id}`) and become UPDATE or DELETE proposals on them. New proposals
// become ADD issues registered as new tickets. Entries that cannot be applied
// are skipped with a warning and reported back.

use std::collections::BTreeSet;

use agility_ticket::{
    ApprovalHandler, IdAllocator, ProposalAction, TicketError, TicketId, TicketKey,
};
use serde::Serialize;

use crate::parser::{IssueFeedback, IssueProposal};

/// Why a modification was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No registered issue with this id.
    UnknownIssue,
    /// Action missing or not Update/Delete.
    UnsupportedAction(Option<String>),
    /// Update without a title or body.
    Incomplete,
}

/// Result of applying one feedback response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppliedFeedback {
    pub updated: Vec<TicketKey>,
    pub deleted: Vec<TicketKey>,
    pub added: Vec<TicketKey>,
    pub skipped: Vec<(u64, SkipReason)>,
}

impl AppliedFeedback {
    /// Keys of every ticket that now carries a pending proposal from this feedback.
    pub fn touched(&self) -> impl Iterator<Item = &TicketKey> {
        self.updated
            .iter()
            .chain(self.deleted.iter())
            .chain(self.added.iter())
    }
}

/// Stage `feedback` on `handler`.
///
/// New issues take ids from `ids` and are linked to `epic_id`. Fails when a
/// new issue's id is already registered; the handler and `ids` are then left
/// untouched.
pub fn apply_issue_feedback(
    handler: &mut ApprovalHandler,
    feedback: &IssueFeedback,
    ids: &mut IdAllocator,
    epic_id: Option<TicketId>,
) -> Result<AppliedFeedback, TicketError> {
    let mut staged_ids = ids.clone();
    let mut new_issues = Vec::with_capacity(feedback.new_proposals.len());
    let mut new_keys = BTreeSet::new();
    for proposal in &feedback.new_proposals {
        let Some(issue) = proposal.to_new_issue(&mut staged_ids, epic_id) else {
            tracing::warn!("skipping new issue proposal without title or body");
            continue;
        };
        let key = TicketKey::issue(issue.id());
        if handler.contains(&key) || !new_keys.insert(key.clone()) {
            return Err(TicketError::DuplicateTicket(key));
        }
        new_issues.push(issue);
    }

    let mut applied = AppliedFeedback::default();
    for (&id, proposal) in &feedback.modifications {
        let key = TicketKey::issue(TicketId(id));
        match apply_modification(handler, &key, proposal) {
            Ok(ProposalAction::Delete) => applied.deleted.push(key),
            Ok(_) => applied.updated.push(key),
            Err(reason) => {
                tracing::warn!(issue_id = id, reason = ?reason, "skipping issue proposal");
                applied.skipped.push((id, reason));
            }
        }
    }

    for issue in new_issues {
        applied.added.push(handler.add_ticket(issue)?);
    }
    *ids = staged_ids;

    tracing::info!(
        updated = applied.updated.len(),
        deleted = applied.deleted.len(),
        added = applied.added.len(),
        skipped = applied.skipped.len(),
        "applied issue feedback"
    );
    Ok(applied)
}

fn apply_modification(
    handler: &mut ApprovalHandler,
    key: &TicketKey,
    proposal: &IssueProposal,
) -> Result<ProposalAction, SkipReason> {
    let issue = handler
        .get_mut(key)
        .and_then(|ticket| ticket.as_issue_mut())
        .ok_or(SkipReason::UnknownIssue)?;

    match proposal.parsed_action() {
        Some(ProposalAction::Update) => {
            let (Some(title), Some(body)) = (&proposal.proposed_title, &proposal.proposed_body)
            else {
                return Err(SkipReason::Incomplete);
            };
            issue.propose_update(title.clone(), body.clone());
            Ok(ProposalAction::Update)
        }
        Some(ProposalAction::Delete) => {
            issue.propose_delete();
            Ok(ProposalAction::Delete)
        }
        Some(ProposalAction::Add) | None => {
            Err(SkipReason::UnsupportedAction(proposal.action.clone()))
        }
    }
}
