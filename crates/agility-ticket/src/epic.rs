// epic.rs - Epic: a high-level vision statement that only ever gets revised.
//
// Every epic is created already approved. The LLM can propose a revision,
// which a reviewer accepts, rejects, or overrides by hand:
//
//   APPROVED --propose_update--> UPDATE --accept/reject/modify--> APPROVED

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TicketError;
use crate::id::TicketId;
use crate::ticket::{Resolution, TicketKind};

/// Lifecycle state of an [`Epic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EpicState {
    /// Content is authoritative, nothing pending.
    Approved,
    /// A revision is waiting for a decision.
    Update,
}

impl EpicState {
    pub fn as_str(self) -> &'static str {
        match self {
            EpicState::Approved => "APPROVED",
            EpicState::Update => "UPDATE",
        }
    }

    /// Returns true if a proposal is waiting for a decision.
    pub fn is_pending(self) -> bool {
        !matches!(self, EpicState::Approved)
    }
}

impl fmt::Display for EpicState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The content fields of an epic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpicContent {
    pub epic_content: String,
}

impl EpicContent {
    pub fn new(epic_content: impl Into<String>) -> Self {
        Self {
            epic_content: epic_content.into(),
        }
    }
}

/// An epic ticket.
///
/// `proposed_content` is `Some` exactly when `state` is [`EpicState::Update`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Epic {
    id: TicketId,
    current_content: EpicContent,
    proposed_content: Option<EpicContent>,
    state: EpicState,
}

impl Epic {
    /// Create an approved epic.
    pub fn new(id: TicketId, epic_content: impl Into<String>) -> Self {
        Self {
            id,
            current_content: EpicContent::new(epic_content),
            proposed_content: None,
            state: EpicState::Approved,
        }
    }

    pub fn id(&self) -> TicketId {
        self.id
    }

    pub fn state(&self) -> EpicState {
        self.state
    }

    pub fn current_content(&self) -> &EpicContent {
        &self.current_content
    }

    pub fn proposed_content(&self) -> Option<&EpicContent> {
        self.proposed_content.as_ref()
    }

    /// The approved epic statement.
    pub fn content(&self) -> &str {
        &self.current_content.epic_content
    }

    /// Stage a revision. Replaces any revision already pending.
    pub fn propose_update(&mut self, proposed: impl Into<String>) {
        self.proposed_content = Some(EpicContent::new(proposed));
        self.state = EpicState::Update;
    }

    /// Promote the pending revision into the current content.
    pub fn accept_proposal(&mut self) -> Result<Resolution, TicketError> {
        match self.state {
            EpicState::Approved => Err(self.nothing_pending("accept")),
            EpicState::Update => {
                if let Some(proposed) = self.proposed_content.take() {
                    self.current_content = proposed;
                }
                self.state = EpicState::Approved;
                Ok(Resolution::Retained)
            }
        }
    }

    /// Drop the pending revision and keep the current content.
    pub fn reject_proposal(&mut self) -> Result<Resolution, TicketError> {
        match self.state {
            EpicState::Approved => Err(self.nothing_pending("reject")),
            EpicState::Update => {
                self.proposed_content = None;
                self.state = EpicState::Approved;
                Ok(Resolution::Retained)
            }
        }
    }

    /// Reviewer override: set the content directly, whatever the state.
    pub fn modify_proposal(&mut self, epic_content: impl Into<String>) {
        self.current_content = EpicContent::new(epic_content);
        self.proposed_content = None;
        self.state = EpicState::Approved;
    }

    pub(crate) fn from_parts(
        id: TicketId,
        current_content: EpicContent,
        proposed_content: Option<EpicContent>,
    ) -> Self {
        let state = if proposed_content.is_some() {
            EpicState::Update
        } else {
            EpicState::Approved
        };
        Self {
            id,
            current_content,
            proposed_content,
            state,
        }
    }

    fn nothing_pending(&self, action: &'static str) -> TicketError {
        TicketError::InvalidStateTransition {
            kind: TicketKind::Epic,
            id: self.id,
            state: self.state.to_string(),
            action,
        }
    }
}

impl fmt::Display for Epic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Epic ID: {}", self.id)?;
        writeln!(f, "State: {}", self.state)?;
        writeln!(f, "Current Content: {}", self.current_content.epic_content)?;
        if let Some(proposed) = &self.proposed_content {
            writeln!(f, "Proposed Content: {}", proposed.epic_content)?;
        }
        Ok(())
    }
}
