// issue.rs - Parse issue feedback/generation output.
//
// Output is a sequence of blocks separated by a blank line. The first line of
// each block decides its kind:
//
//   Issue <id>:           Action / Proposed Title / Proposed Body
//   New Issue:            Proposed Title / Proposed Body (action is Add)
//   Proposal Summary:     free text
//
// `Proposed Body:` swallows every remaining line of its block. Malformed
// blocks are skipped with a warning; the parse itself never fails.

use std::collections::BTreeMap;

use agility_ticket::{IdAllocator, Issue, ProposalAction, TicketId};
use serde::{Deserialize, Serialize};

const SUMMARY_HEADER: &str = "Proposal Summary:";
const ISSUE_HEADER: &str = "Issue";
const NEW_ISSUE_HEADER: &str = "New Issue:";
const ACTION_FIELD: &str = "Action:";
const TITLE_FIELD: &str = "Proposed Title:";
const BODY_FIELD: &str = "Proposed Body:";

/// One proposed change, as written by the model.
///
/// `action` keeps the model's spelling; compare it with
/// [`IssueProposal::parsed_action`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueProposal {
    pub action: Option<String>,
    pub proposed_title: Option<String>,
    pub proposed_body: Option<String>,
}

impl IssueProposal {
    pub fn new(
        action: impl Into<String>,
        proposed_title: impl Into<String>,
        proposed_body: impl Into<String>,
    ) -> Self {
        Self {
            action: Some(action.into()),
            proposed_title: Some(proposed_title.into()),
            proposed_body: Some(proposed_body.into()),
        }
    }

    pub fn parsed_action(&self) -> Option<ProposalAction> {
        self.action.as_deref().and_then(ProposalAction::parse)
    }

    /// Build an ADD issue from a `New Issue:` proposal.
    ///
    /// Returns `None` when the title or body is missing.
    pub fn to_new_issue(&self, ids: &mut IdAllocator, epic_id: Option<TicketId>) -> Option<Issue> {
        let (Some(title), Some(body)) = (&self.proposed_title, &self.proposed_body) else {
            return None;
        };
        let mut issue = Issue::proposed_new(ids.next_id(), title.clone(), body.clone());
        issue.set_epic_id(epic_id);
        Some(issue)
    }
}

/// Everything extracted from one issue feedback response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueFeedback {
    /// Proposals against existing issues, keyed by issue id.
    pub modifications: BTreeMap<u64, IssueProposal>,
    /// Proposals for brand-new issues, in output order.
    pub new_proposals: Vec<IssueProposal>,
    pub proposal_summary: String,
}

impl IssueFeedback {
    pub fn is_empty(&self) -> bool {
        self.modifications.is_empty()
            && self.new_proposals.is_empty()
            && self.proposal_summary.is_empty()
    }
}

/// Parse raw LLM text into per-issue modifications, new proposals and a summary.
pub fn parse_issue_feedback(raw_output: &str) -> IssueFeedback {
    let normalized = raw_output.replace("\r\n", "\n");
    let mut feedback = IssueFeedback::default();

    for block in normalized.split("\n\n").map(str::trim) {
        if block.is_empty() {
            continue;
        }
        let lines: Vec<&str> = block.lines().collect();
        let header = lines[0].trim();
        let rest = &lines[1..];

        if header.starts_with(SUMMARY_HEADER) {
            feedback.proposal_summary = join_trimmed(rest);
        } else if header.starts_with(ISSUE_HEADER) {
            let Some(id) = parse_issue_id(header) else {
                tracing::warn!(header = %header, "skipping issue block with unparsable id");
                continue;
            };
            let proposal = parse_fields(rest, true);
            let is_update = proposal.parsed_action() == Some(ProposalAction::Update);
            let complete = proposal.proposed_title.is_some() && proposal.proposed_body.is_some();
            if is_update && !complete {
                tracing::warn!(issue_id = id, "dropping incomplete update proposal");
                continue;
            }
            feedback.modifications.insert(id, proposal);
        } else if header.starts_with(NEW_ISSUE_HEADER) {
            let mut proposal = parse_fields(rest, false);
            proposal.action = Some(ProposalAction::Add.as_str().to_string());
            if proposal.proposed_title.is_none() || proposal.proposed_body.is_none() {
                tracing::warn!("dropping incomplete new issue proposal");
                continue;
            }
            feedback.new_proposals.push(proposal);
        }
    }

    if feedback.is_empty() {
        tracing::warn!("issue output contained no recognizable blocks");
    }
    feedback
}

/// `Issue 12:` -> 12. The id is the second whitespace token, colons removed.
fn parse_issue_id(header: &str) -> Option<u64> {
    header
        .split_whitespace()
        .nth(1)
        .and_then(|token| token.replace(':', "").parse().ok())
}

fn parse_fields(lines: &[&str], read_action: bool) -> IssueProposal {
    let mut proposal = IssueProposal::default();

    for (idx, raw_line) in lines.iter().enumerate() {
        let line = raw_line.trim();
        if let Some(action) = line.strip_prefix(ACTION_FIELD) {
            if read_action {
                proposal.action = non_empty(action.trim());
            }
        } else if let Some(title) = line.strip_prefix(TITLE_FIELD) {
            proposal.proposed_title = non_empty(title.trim());
        } else if let Some(inline) = line.strip_prefix(BODY_FIELD) {
            let mut body_lines = Vec::with_capacity(lines.len() - idx);
            let inline = inline.trim();
            if !inline.is_empty() {
                body_lines.push(inline);
            }
            body_lines.extend(lines[idx + 1..].iter().map(|l| l.trim()));
            proposal.proposed_body = non_empty(body_lines.join("\n").trim());
            break;
        }
    }

    proposal
}

fn join_trimmed(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}
