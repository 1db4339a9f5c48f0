// issue.rs - Issue: a unit of work, optionally linked to a parent epic.
//
// Issues have three kinds of pending proposal:
//
//   APPROVED --propose_update--> UPDATE  --accept--> APPROVED (new content)
//   APPROVED --propose_delete--> DELETE  --accept--> discarded
//   (constructed)                 ADD     --accept--> APPROVED (proposed content)
//                                         --reject--> discarded
//
// A discarded issue is not mutated; the caller (normally the approval
// handler) is responsible for dropping it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TicketError;
use crate::id::TicketId;
use crate::ticket::{Resolution, TicketKind};

/// Lifecycle state of an [`Issue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueState {
    /// Content is authoritative, nothing pending.
    Approved,
    /// A new title/body is waiting for a decision.
    Update,
    /// Removal is waiting for a decision.
    Delete,
    /// A brand-new issue is waiting for a decision.
    Add,
}

impl IssueState {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueState::Approved => "APPROVED",
            IssueState::Update => "UPDATE",
            IssueState::Delete => "DELETE",
            IssueState::Add => "ADD",
        }
    }

    /// Returns true if a proposal is waiting for a decision.
    pub fn is_pending(self) -> bool {
        !matches!(self, IssueState::Approved)
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an LLM proposes to do with an issue, as written after `Action:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalAction {
    Update,
    Delete,
    Add,
}

impl ProposalAction {
    /// Case-insensitive parse of the action text; unknown actions are `None`.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "update" => Some(ProposalAction::Update),
            "delete" => Some(ProposalAction::Delete),
            "add" => Some(ProposalAction::Add),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProposalAction::Update => "Update",
            ProposalAction::Delete => "Delete",
            ProposalAction::Add => "Add",
        }
    }

    /// The pending state an issue carrying this proposal is in.
    pub fn state(self) -> IssueState {
        match self {
            ProposalAction::Update => IssueState::Update,
            ProposalAction::Delete => IssueState::Delete,
            ProposalAction::Add => IssueState::Add,
        }
    }
}

impl fmt::Display for ProposalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The content fields of an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueContent {
    pub issue_title: String,
    pub issue_body: String,
}

impl IssueContent {
    pub fn new(issue_title: impl Into<String>, issue_body: impl Into<String>) -> Self {
        Self {
            issue_title: issue_title.into(),
            issue_body: issue_body.into(),
        }
    }
}

/// An issue ticket.
///
/// `proposed_content` is `Some` exactly when `state` is not
/// [`IssueState::Approved`]. For `DELETE` it holds the content being removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    id: TicketId,
    current_content: IssueContent,
    proposed_content: Option<IssueContent>,
    state: IssueState,
    epic_id: Option<TicketId>,
}

impl Issue {
    /// Create an approved issue.
    pub fn new(
        id: TicketId,
        issue_title: impl Into<String>,
        issue_body: impl Into<String>,
    ) -> Self {
        Self {
            id,
            current_content: IssueContent::new(issue_title, issue_body),
            proposed_content: None,
            state: IssueState::Approved,
            epic_id: None,
        }
    }

    /// Create an issue that is only proposed (`ADD`). It has no approved
    /// content until accepted.
    pub fn proposed_new(
        id: TicketId,
        issue_title: impl Into<String>,
        issue_body: impl Into<String>,
    ) -> Self {
        Self {
            id,
            current_content: IssueContent::default(),
            proposed_content: Some(IssueContent::new(issue_title, issue_body)),
            state: IssueState::Add,
            epic_id: None,
        }
    }

    /// Link to a parent epic (builder).
    pub fn with_epic(mut self, epic_id: TicketId) -> Self {
        self.epic_id = Some(epic_id);
        self
    }

    pub fn id(&self) -> TicketId {
        self.id
    }

    pub fn state(&self) -> IssueState {
        self.state
    }

    pub fn epic_id(&self) -> Option<TicketId> {
        self.epic_id
    }

    pub fn set_epic_id(&mut self, epic_id: Option<TicketId>) {
        self.epic_id = epic_id;
    }

    pub fn current_content(&self) -> &IssueContent {
        &self.current_content
    }

    pub fn proposed_content(&self) -> Option<&IssueContent> {
        self.proposed_content.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.current_content.issue_title
    }

    pub fn body(&self) -> &str {
        &self.current_content.issue_body
    }

    /// Stage a new title and body. Replaces any proposal already pending.
    pub fn propose_update(
        &mut self,
        proposed_title: impl Into<String>,
        proposed_body: impl Into<String>,
    ) {
        self.proposed_content = Some(IssueContent::new(proposed_title, proposed_body));
        self.state = IssueState::Update;
    }

    /// Stage removal of this issue.
    pub fn propose_delete(&mut self) {
        self.proposed_content = Some(self.current_content.clone());
        self.state = IssueState::Delete;
    }

    pub fn accept_proposal(&mut self) -> Result<Resolution, TicketError> {
        match self.state {
            IssueState::Approved => Err(self.nothing_pending("accept")),
            IssueState::Delete => Ok(Resolution::Discarded),
            IssueState::Update | IssueState::Add => {
                if let Some(proposed) = self.proposed_content.take() {
                    self.current_content = proposed;
                }
                self.state = IssueState::Approved;
                Ok(Resolution::Retained)
            }
        }
    }

    pub fn reject_proposal(&mut self) -> Result<Resolution, TicketError> {
        match self.state {
            IssueState::Approved => Err(self.nothing_pending("reject")),
            IssueState::Add => Ok(Resolution::Discarded),
            IssueState::Update | IssueState::Delete => {
                self.proposed_content = None;
                self.state = IssueState::Approved;
                Ok(Resolution::Retained)
            }
        }
    }

    /// Reviewer override: set title and body directly, whatever the state.
    pub fn modify_proposal(
        &mut self,
        issue_title: impl Into<String>,
        issue_body: impl Into<String>,
    ) {
        self.current_content = IssueContent::new(issue_title, issue_body);
        self.proposed_content = None;
        self.state = IssueState::Approved;
    }

    pub(crate) fn from_parts(
        id: TicketId,
        current_content: IssueContent,
        proposed_content: Option<IssueContent>,
        state: IssueState,
        epic_id: Option<TicketId>,
    ) -> Self {
        Self {
            id,
            current_content,
            proposed_content,
            state,
            epic_id,
        }
    }

    fn nothing_pending(&self, action: &'static str) -> TicketError {
        TicketError::InvalidStateTransition {
            kind: TicketKind::Issue,
            id: self.id,
            state: self.state.to_string(),
            action,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Issue ID: {}", self.id)?;
        match self.epic_id {
            Some(epic_id) => writeln!(f, "Linked Epic ID: {epic_id}")?,
            None => writeln!(f, "Linked Epic ID: none")?,
        }
        writeln!(f, "State: {}", self.state)?;
        writeln!(f, "Title: {}", self.current_content.issue_title)?;
        writeln!(f, "Body: {}", self.current_content.issue_body)?;
        if let Some(proposed) = &self.proposed_content {
            writeln!(f, "Proposed Title: {}", proposed.issue_title)?;
            writeln!(f, "Proposed Body: {}", proposed.issue_body)?;
        }
        Ok(())
    }
}
