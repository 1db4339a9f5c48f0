// ticket.rs - The Ticket tagged variant and its identity key.
//
// Everything that handles "some ticket" (the approval handler, events,
// serialization) goes through `Ticket`, which dispatches each lifecycle
// operation to the Epic or Issue implementation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::epic::{Epic, EpicContent};
use crate::error::TicketError;
use crate::id::TicketId;
use crate::issue::{Issue, IssueContent};

/// Which variant a ticket is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketKind {
    Epic,
    Issue,
}

impl TicketKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketKind::Epic => "epic",
            TicketKind::Issue => "issue",
        }
    }
}

impl fmt::Display for TicketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup identity of a ticket: `"{kind}_{id}"`, e.g. `epic_3`.
///
/// Compared as an exact string, with no normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketKey(String);

impl TicketKey {
    pub fn new(kind: TicketKind, id: TicketId) -> Self {
        Self(format!("{}_{}", kind, id))
    }

    pub fn epic(id: TicketId) -> Self {
        Self::new(TicketKind::Epic, id)
    }

    pub fn issue(id: TicketId) -> Self {
        Self::new(TicketKind::Issue, id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TicketKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Outcome of resolving a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The ticket lives on, approved.
    Retained,
    /// The ticket should cease to exist (accepted delete, rejected add).
    Discarded,
}

/// Reviewer-supplied content for [`Ticket::modify_proposal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TicketContent {
    Epic(EpicContent),
    Issue(IssueContent),
}

impl TicketContent {
    pub fn epic(epic_content: impl Into<String>) -> Self {
        TicketContent::Epic(EpicContent::new(epic_content))
    }

    pub fn issue(issue_title: impl Into<String>, issue_body: impl Into<String>) -> Self {
        TicketContent::Issue(IssueContent::new(issue_title, issue_body))
    }

    pub fn kind(&self) -> TicketKind {
        match self {
            TicketContent::Epic(_) => TicketKind::Epic,
            TicketContent::Issue(_) => TicketKind::Issue,
        }
    }
}

/// A ticket of either kind.
///
/// Serializes as the variant's fields plus a `"kind"` tag:
/// `{"kind": "issue", "id": 3, "current_content": {...}, "proposed_content": null,
/// "state": "APPROVED", "epic_id": 1}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ticket {
    Epic(Epic),
    Issue(Issue),
}

impl Ticket {
    pub fn kind(&self) -> TicketKind {
        match self {
            Ticket::Epic(_) => TicketKind::Epic,
            Ticket::Issue(_) => TicketKind::Issue,
        }
    }

    pub fn id(&self) -> TicketId {
        match self {
            Ticket::Epic(epic) => epic.id(),
            Ticket::Issue(issue) => issue.id(),
        }
    }

    pub fn key(&self) -> TicketKey {
        TicketKey::new(self.kind(), self.id())
    }

    /// State name as used on the wire (`APPROVED`, `UPDATE`, ...).
    pub fn state_name(&self) -> &'static str {
        match self {
            Ticket::Epic(epic) => epic.state().as_str(),
            Ticket::Issue(issue) => issue.state().as_str(),
        }
    }

    pub fn is_pending(&self) -> bool {
        match self {
            Ticket::Epic(epic) => epic.state().is_pending(),
            Ticket::Issue(issue) => issue.state().is_pending(),
        }
    }

    pub fn accept_proposal(&mut self) -> Result<Resolution, TicketError> {
        match self {
            Ticket::Epic(epic) => epic.accept_proposal(),
            Ticket::Issue(issue) => issue.accept_proposal(),
        }
    }

    pub fn reject_proposal(&mut self) -> Result<Resolution, TicketError> {
        match self {
            Ticket::Epic(epic) => epic.reject_proposal(),
            Ticket::Issue(issue) => issue.reject_proposal(),
        }
    }

    /// Apply reviewer content. Fails if the content is for the other kind.
    pub fn modify_proposal(&mut self, content: TicketContent) -> Result<(), TicketError> {
        match (self, content) {
            (Ticket::Epic(epic), TicketContent::Epic(content)) => {
                epic.modify_proposal(content.epic_content);
                Ok(())
            }
            (Ticket::Issue(issue), TicketContent::Issue(content)) => {
                issue.modify_proposal(content.issue_title, content.issue_body);
                Ok(())
            }
            (ticket, content) => Err(TicketError::ContentMismatch {
                key: ticket.key(),
                expected: ticket.kind(),
                found: content.kind(),
            }),
        }
    }

    pub fn as_epic(&self) -> Option<&Epic> {
        match self {
            Ticket::Epic(epic) => Some(epic),
            Ticket::Issue(_) => None,
        }
    }

    pub fn as_epic_mut(&mut self) -> Option<&mut Epic> {
        match self {
            Ticket::Epic(epic) => Some(epic),
            Ticket::Issue(_) => None,
        }
    }

    pub fn as_issue(&self) -> Option<&Issue> {
        match self {
            Ticket::Issue(issue) => Some(issue),
            Ticket::Epic(_) => None,
        }
    }

    pub fn as_issue_mut(&mut self) -> Option<&mut Issue> {
        match self {
            Ticket::Issue(issue) => Some(issue),
            Ticket::Epic(_) => None,
        }
    }
}

impl From<Epic> for Ticket {
    fn from(epic: Epic) -> Self {
        Ticket::Epic(epic)
    }
}

impl From<Issue> for Ticket {
    fn from(issue: Issue) -> Self {
        Ticket::Issue(issue)
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ticket::Epic(epic) => fmt::Display::fmt(epic, f),
            Ticket::Issue(issue) => fmt::Display::fmt(issue, f),
        }
    }
}
