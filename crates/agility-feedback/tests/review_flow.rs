// review_flow.rs - End-to-end review flow with a scripted model.
//
//   1. Generate an epic from a prompt, register it
//   2. Generate issues for the epic, register them as new tickets
//   3. Reviewer approves one new issue, rejects the other
//   4. Epic feedback proposes a revision; reviewer edits it by hand
//   5. Issue feedback proposes an update, a delete and an addition
//   6. Reviewer accepts the delete and the addition, rejects the update
//
// VERIFY:
//   - Registry contents and states after every decision
//   - Flat records match what the model proposed
//   - Event log holds one line per handler mutation, in order

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;

use agility_feedback::{Assistant, CompletionModel, FeedbackError};
use agility_ticket::{
    ApprovalHandler, EpicState, IdAllocator, IssueRecord, IssueState, LogSink, Resolution, Ticket,
    TicketContent, TicketId, TicketKey,
};

struct ScriptedModel {
    responses: RefCell<VecDeque<&'static str>>,
}

impl ScriptedModel {
    fn new(responses: Vec<&'static str>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
        }
    }
}

impl CompletionModel for ScriptedModel {
    fn complete(&self, _system: &str, _user: &str) -> Result<String, FeedbackError> {
        self.responses
            .borrow_mut()
            .pop_front()
            .map(str::to_string)
            .ok_or_else(|| FeedbackError::ModelResponse("no scripted response left".into()))
    }
}

const EPIC: &str = "\
Epic:
Multi-factor authentication for every user.

Summary:
The prompt asks for secure access across platforms.";

const ISSUES: &str = "\
New Issue:
Proposed Title: TOTP enrollment
Proposed Body:
Users can enroll an authenticator app.

New Issue:
Proposed Title: SMS codes
Proposed Body:
Send one-time codes by SMS.

Proposal Summary:
Two delivery channels for second factors.";

const EPIC_FEEDBACK: &str = "\
Proposed Epic:
Multi-factor authentication for every user, including mobile.

Changes Summary:
Included mobile clients as requested.";

const ISSUE_FEEDBACK: &str = "\
Issue 1:
Action: Update
Proposed Title: TOTP enrollment and recovery
Proposed Body:
Enrollment plus recovery codes.

Issue 3:
Action: Delete

New Issue:
Action: Add
Proposed Title: WebAuthn keys
Proposed Body:
Support hardware security keys.

Proposal Summary:
Expanded TOTP, dropped the orphan issue, added WebAuthn.";

fn issue_key(id: u64) -> TicketKey {
    TicketKey::issue(TicketId(id))
}

#[test]
fn generate_review_and_revise() {
    let log_dir = tempfile::tempdir().unwrap();
    let log_path = log_dir.path().join("events.jsonl");

    let assistant = Assistant::new(ScriptedModel::new(vec![
        EPIC,
        ISSUES,
        EPIC_FEEDBACK,
        ISSUE_FEEDBACK,
    ]));
    let mut ids = IdAllocator::new();
    let mut handler = ApprovalHandler::new();
    handler.add_sink(Box::new(LogSink::new(&log_path)));

    // 1. Epic
    let (epic, summary) = assistant
        .generate_epic("secure access across platforms", &mut ids)
        .unwrap();
    assert_eq!(summary, "The prompt asks for secure access across platforms.");
    let epic_key = handler.add_ticket(epic.clone()).unwrap();
    assert_eq!(epic_key.as_str(), "epic_0");

    // 2. Issues for the epic
    let (issues, summary) = assistant.generate_issues(&epic, None, &mut ids).unwrap();
    assert_eq!(summary, "Two delivery channels for second factors.");
    assert_eq!(issues.len(), 2);
    for issue in issues {
        handler.add_ticket(issue).unwrap();
    }
    assert!(handler.is_new(&issue_key(1)));
    assert!(handler.is_new(&issue_key(2)));

    // 3. Decisions on the new issues
    assert_eq!(handler.approve_ticket(&issue_key(1)).unwrap(), Resolution::Retained);
    assert_eq!(handler.reject_ticket(&issue_key(2)).unwrap(), Resolution::Discarded);
    assert!(!handler.contains(&issue_key(2)));
    let approved = handler.get(&issue_key(1)).and_then(Ticket::as_issue).unwrap();
    assert_eq!(approved.state(), IssueState::Approved);
    assert_eq!(approved.title(), "TOTP enrollment");
    assert_eq!(approved.epic_id(), Some(TicketId(0)));

    // An unrelated legacy issue arrives as a flat record.
    let record: IssueRecord = serde_json::from_str(
        r#"{"issue_id": 3, "issue_title": "Orphan", "issue_body": "No longer relevant"}"#,
    )
    .unwrap();
    handler
        .add_ticket(agility_ticket::Issue::try_from(record).unwrap())
        .unwrap();
    let mut ids = IdAllocator::after(handler.ids());

    // 4. Epic feedback, then a hand edit
    let epic_mut = handler
        .get_mut(&epic_key)
        .and_then(Ticket::as_epic_mut)
        .unwrap();
    let changes = assistant
        .epic_feedback(epic_mut, "cover mobile", "auth service exists")
        .unwrap();
    assert_eq!(changes, "Included mobile clients as requested.");
    assert_eq!(epic_mut.state(), EpicState::Update);

    handler
        .modify_ticket(
            &epic_key,
            TicketContent::epic("MFA for every user on web and mobile."),
        )
        .unwrap();
    let epic = handler.get(&epic_key).and_then(Ticket::as_epic).unwrap();
    assert_eq!(epic.state(), EpicState::Approved);
    assert_eq!(epic.content(), "MFA for every user on web and mobile.");

    // 5. Issue feedback
    let outcome = assistant
        .issue_feedback(&mut handler, "add recovery", &mut ids, Some(TicketId(0)))
        .unwrap();
    assert_eq!(
        outcome.proposal_summary,
        "Expanded TOTP, dropped the orphan issue, added WebAuthn."
    );
    assert_eq!(outcome.applied.updated, vec![issue_key(1)]);
    assert_eq!(outcome.applied.deleted, vec![issue_key(3)]);
    assert_eq!(outcome.applied.added, vec![issue_key(4)]);

    let update = IssueRecord::from(handler.get(&issue_key(1)).and_then(Ticket::as_issue).unwrap());
    assert_eq!(update.proposed_action.as_deref(), Some("Update"));
    assert_eq!(
        update.proposed_issue_title.as_deref(),
        Some("TOTP enrollment and recovery")
    );

    // 6. Decisions on the feedback
    assert_eq!(handler.approve_ticket(&issue_key(3)).unwrap(), Resolution::Discarded);
    assert!(!handler.contains(&issue_key(3)));
    assert_eq!(handler.approve_ticket(&issue_key(4)).unwrap(), Resolution::Retained);
    assert_eq!(handler.reject_ticket(&issue_key(1)).unwrap(), Resolution::Retained);

    let kept = handler.get(&issue_key(1)).and_then(Ticket::as_issue).unwrap();
    assert_eq!(kept.title(), "TOTP enrollment");
    assert!(handler.pending().is_empty());
    assert_eq!(handler.len(), 3);

    // Decisions are single-use.
    assert!(handler.reject_ticket(&issue_key(1)).is_err());

    // Event log
    let events: Vec<serde_json::Value> = fs::read_to_string(&log_path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let types: Vec<&str> = events
        .iter()
        .map(|e| e["event_type"].as_str().unwrap())
        .collect();
    assert_eq!(
        types,
        vec![
            "ticket_added",      // epic_0
            "ticket_added",      // issue_1
            "ticket_added",      // issue_2
            "proposal_accepted", // issue_1
            "ticket_discarded",  // issue_2
            "ticket_added",      // issue_3
            "ticket_modified",   // epic_0
            "ticket_added",      // issue_4
            "ticket_discarded",  // issue_3
            "proposal_accepted", // issue_4
            "proposal_rejected", // issue_1
        ]
    );
    assert_eq!(events[0]["key"], "epic_0");
    assert_eq!(events[7]["state"], "ADD");
}
