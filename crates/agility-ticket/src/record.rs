// record.rs - Flat record shapes for tickets.
//
// Older consumers exchange tickets as flat JSON objects with the proposal
// spread over `proposed_*` fields instead of the state-machine shape:
//
//   Epic  {epic_id, epic_content, proposed_content}
//   Issue {issue_id, issue_title, issue_body,
//          proposed_issue_title, proposed_issue_body, proposed_action}
//
// These records convert to and from the canonical Epic/Issue types. A new
// (ADD) issue is written with its proposed content in issue_title/issue_body
// and `proposed_action: "Add"`, matching what those consumers produce.

use serde::{Deserialize, Serialize};

use crate::epic::{Epic, EpicContent};
use crate::error::TicketError;
use crate::id::TicketId;
use crate::issue::{Issue, IssueContent, IssueState, ProposalAction};
use crate::ticket::TicketKind;

/// Flat epic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpicRecord {
    pub epic_id: TicketId,
    pub epic_content: String,
    #[serde(default)]
    pub proposed_content: Option<String>,
}

impl From<&Epic> for EpicRecord {
    fn from(epic: &Epic) -> Self {
        Self {
            epic_id: epic.id(),
            epic_content: epic.content().to_string(),
            proposed_content: epic.proposed_content().map(|c| c.epic_content.clone()),
        }
    }
}

impl From<EpicRecord> for Epic {
    fn from(record: EpicRecord) -> Self {
        Epic::from_parts(
            record.epic_id,
            EpicContent::new(record.epic_content),
            record.proposed_content.map(EpicContent::new),
        )
    }
}

/// Flat issue record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub issue_id: TicketId,
    pub issue_title: String,
    pub issue_body: String,
    #[serde(default)]
    pub proposed_issue_title: Option<String>,
    #[serde(default)]
    pub proposed_issue_body: Option<String>,
    #[serde(default)]
    pub proposed_action: Option<String>,
}

impl From<&Issue> for IssueRecord {
    fn from(issue: &Issue) -> Self {
        let current = issue.current_content();
        let proposed = issue.proposed_content();
        let (issue_title, issue_body) = match (issue.state(), proposed) {
            (IssueState::Add, Some(proposed)) => {
                (proposed.issue_title.clone(), proposed.issue_body.clone())
            }
            _ => (current.issue_title.clone(), current.issue_body.clone()),
        };
        let (proposed_issue_title, proposed_issue_body) = match (issue.state(), proposed) {
            (IssueState::Update, Some(proposed)) => (
                Some(proposed.issue_title.clone()),
                Some(proposed.issue_body.clone()),
            ),
            _ => (None, None),
        };
        let proposed_action = match issue.state() {
            IssueState::Approved => None,
            IssueState::Update => Some(ProposalAction::Update),
            IssueState::Delete => Some(ProposalAction::Delete),
            IssueState::Add => Some(ProposalAction::Add),
        };

        Self {
            issue_id: issue.id(),
            issue_title,
            issue_body,
            proposed_issue_title,
            proposed_issue_body,
            proposed_action: proposed_action.map(|action| action.as_str().to_string()),
        }
    }
}

impl TryFrom<IssueRecord> for Issue {
    type Error = TicketError;

    fn try_from(record: IssueRecord) -> Result<Self, Self::Error> {
        let id = record.issue_id;
        let invalid = |reason: String| TicketError::InvalidRecord {
            kind: TicketKind::Issue,
            id,
            reason,
        };

        let Some(action_text) = record.proposed_action.as_deref() else {
            return Ok(Issue::new(id, record.issue_title, record.issue_body));
        };
        let action = ProposalAction::parse(action_text)
            .ok_or_else(|| invalid(format!("unknown proposed_action '{action_text}'")))?;

        let current = IssueContent::new(record.issue_title, record.issue_body);
        let issue = match action {
            ProposalAction::Update => {
                let (Some(title), Some(body)) =
                    (record.proposed_issue_title, record.proposed_issue_body)
                else {
                    return Err(invalid(
                        "Update requires proposed_issue_title and proposed_issue_body".to_string(),
                    ));
                };
                Issue::from_parts(
                    id,
                    current,
                    Some(IssueContent::new(title, body)),
                    IssueState::Update,
                    None,
                )
            }
            ProposalAction::Delete => {
                Issue::from_parts(id, current.clone(), Some(current), IssueState::Delete, None)
            }
            ProposalAction::Add => Issue::from_parts(
                id,
                IssueContent::default(),
                Some(current),
                IssueState::Add,
                None,
            ),
        };
        Ok(issue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epic_record_has_flat_shape() {
        let mut epic = Epic::new(TicketId(1), "v1");
        epic.propose_update("v2");
        let json = serde_json::to_value(EpicRecord::from(&epic)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"epic_id": 1, "epic_content": "v1", "proposed_content": "v2"})
        );
    }

    #[test]
    fn epic_record_with_proposal_reads_back_as_update() {
        let record: EpicRecord = serde_json::from_str(
            r#"{"epic_id": 4, "epic_content": "old", "proposed_content": "new"}"#,
        )
        .unwrap();
        let mut epic = Epic::from(record);
        assert_eq!(epic.state(), crate::epic::EpicState::Update);
        epic.accept_proposal().unwrap();
        assert_eq!(epic.content(), "new");
    }

    #[test]
    fn issue_record_defaults_missing_proposal_fields() {
        let record: IssueRecord =
            serde_json::from_str(r#"{"issue_id": 2, "issue_title": "t", "issue_body": "b"}"#)
                .unwrap();
        let issue = Issue::try_from(record).unwrap();
        assert_eq!(issue.state(), IssueState::Approved);
        assert_eq!(issue.title(), "t");
    }

    #[test]
    fn update_issue_writes_proposed_fields() {
        let mut issue = Issue::new(TicketId(3), "t", "b");
        issue.propose_update("t2", "b2");
        let record = IssueRecord::from(&issue);
        assert_eq!(record.proposed_action.as_deref(), Some("Update"));
        assert_eq!(record.proposed_issue_title.as_deref(), Some("t2"));
        assert_eq!(record.issue_title, "t");
    }

    #[test]
    fn delete_issue_has_action_only() {
        let mut issue = Issue::new(TicketId(3), "t", "b");
        issue.propose_delete();
        let record = IssueRecord::from(&issue);
        assert_eq!(record.proposed_action.as_deref(), Some("Delete"));
        assert!(record.proposed_issue_title.is_none());
        assert!(record.proposed_issue_body.is_none());
    }

    #[test]
    fn add_issue_round_trips_through_record() {
        let issue = Issue::proposed_new(TicketId(7), "New", "Body");
        let record = IssueRecord::from(&issue);
        assert_eq!(record.issue_title, "New");
        assert_eq!(record.proposed_action.as_deref(), Some("Add"));

        let back = Issue::try_from(record).unwrap();
        assert_eq!(back, issue);
    }

    #[test]
    fn record_actions_are_case_insensitive() {
        let record = IssueRecord {
            issue_id: TicketId(1),
            issue_title: "t".into(),
            issue_body: "b".into(),
            proposed_issue_title: None,
            proposed_issue_body: None,
            proposed_action: Some("DELETE".into()),
        };
        assert_eq!(Issue::try_from(record).unwrap().state(), IssueState::Delete);
    }

    #[test]
    fn invalid_records_are_rejected() {
        let unknown = IssueRecord {
            issue_id: TicketId(1),
            issue_title: "t".into(),
            issue_body: "b".into(),
            proposed_issue_title: None,
            proposed_issue_body: None,
            proposed_action: Some("Archive".into()),
        };
        assert!(matches!(
            Issue::try_from(unknown),
            Err(TicketError::InvalidRecord { .. })
        ));

        let incomplete = IssueRecord {
            issue_id: TicketId(1),
            issue_title: "t".into(),
            issue_body: "b".into(),
            proposed_issue_title: Some("t2".into()),
            proposed_issue_body: None,
            proposed_action: Some("Update".into()),
        };
        let err = Issue::try_from(incomplete).unwrap_err();
        assert!(err.to_string().contains("invalid record for issue 1"));
    }
}
