// approval.rs - ApprovalHandler: the registry that mediates human decisions.
//
// Two mappings, both keyed by "{kind}_{id}":
//   tickets      approved tickets, possibly with an update/delete pending
//   new_tickets  issues proposed for creation (state ADD), not yet real
//
// An issue key lives in at most one of the two. Approving or modifying a new
// issue moves it into `tickets` first; rejecting it just drops it.
//
// All operations take `&mut self`, so a handler shared between threads must
// sit behind a Mutex.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::TicketError;
use crate::id::TicketId;
use crate::events::{EventDispatcher, NotificationSink, TicketEvent};
use crate::issue::{Issue, IssueState};
use crate::ticket::{Resolution, Ticket, TicketContent, TicketKey, TicketKind};

/// Registry of tickets awaiting or past review.
#[derive(Default)]
pub struct ApprovalHandler {
    tickets: BTreeMap<TicketKey, Ticket>,
    new_tickets: BTreeMap<TicketKey, Issue>,
    dispatcher: EventDispatcher,
}

impl ApprovalHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `dispatcher` for lifecycle events (builder).
    pub fn with_dispatcher(mut self, dispatcher: EventDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn add_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.dispatcher.add_sink(sink);
    }

    /// Register a ticket. `ADD` issues go to `new_tickets`, everything else
    /// to `tickets`.
    pub fn add_ticket(&mut self, ticket: impl Into<Ticket>) -> Result<TicketKey, TicketError> {
        let ticket = ticket.into();
        let key = ticket.key();
        if self.contains(&key) {
            return Err(TicketError::DuplicateTicket(key));
        }

        let state = ticket.state_name();
        match ticket {
            Ticket::Issue(issue) if issue.state() == IssueState::Add => {
                self.new_tickets.insert(key.clone(), issue);
            }
            ticket => {
                self.tickets.insert(key.clone(), ticket);
            }
        }

        tracing::info!("adding {} in state {}", key, state);
        self.dispatcher.dispatch(&TicketEvent::added(key.clone(), state));
        Ok(key)
    }

    /// Remove a ticket from whichever mapping holds it.
    ///
    /// Fails only when the key is in neither mapping.
    pub fn remove_ticket(&mut self, key: &TicketKey) -> Result<Ticket, TicketError> {
        let removed = match self.new_tickets.remove(key) {
            Some(issue) => Ticket::Issue(issue),
            None => self
                .tickets
                .remove(key)
                .ok_or_else(|| TicketError::TicketNotFound(key.clone()))?,
        };

        tracing::info!("removing {}", key);
        self.dispatcher.dispatch(&TicketEvent::removed(key.clone()));
        Ok(removed)
    }

    /// Accept the pending proposal. A new issue is promoted into `tickets`
    /// first; an accepted delete drops the issue.
    pub fn approve_ticket(&mut self, key: &TicketKey) -> Result<Resolution, TicketError> {
        self.promote(key);
        let ticket = self
            .tickets
            .get_mut(key)
            .ok_or_else(|| TicketError::TicketNotFound(key.clone()))?;

        let resolution = ticket.accept_proposal()?;
        match resolution {
            Resolution::Retained => {
                tracing::info!("approved {}", key);
                self.dispatcher.dispatch(&TicketEvent::accepted(key.clone()));
            }
            Resolution::Discarded => {
                self.tickets.remove(key);
                tracing::info!("approved removal of {}", key);
                self.dispatcher.dispatch(&TicketEvent::discarded(key.clone()));
            }
        }
        Ok(resolution)
    }

    /// Reject the pending proposal. A rejected new issue never becomes a
    /// ticket.
    pub fn reject_ticket(&mut self, key: &TicketKey) -> Result<Resolution, TicketError> {
        if self.new_tickets.remove(key).is_some() {
            tracing::info!("rejected new {}", key);
            self.dispatcher.dispatch(&TicketEvent::discarded(key.clone()));
            return Ok(Resolution::Discarded);
        }

        let ticket = self
            .tickets
            .get_mut(key)
            .ok_or_else(|| TicketError::TicketNotFound(key.clone()))?;

        let resolution = ticket.reject_proposal()?;
        match resolution {
            Resolution::Retained => {
                tracing::info!("rejected proposal for {}", key);
                self.dispatcher.dispatch(&TicketEvent::rejected(key.clone()));
            }
            Resolution::Discarded => {
                self.tickets.remove(key);
                tracing::info!("rejected {}, dropping it", key);
                self.dispatcher.dispatch(&TicketEvent::discarded(key.clone()));
            }
        }
        Ok(resolution)
    }

    /// Replace the ticket's content with reviewer-supplied content.
    pub fn modify_ticket(
        &mut self,
        key: &TicketKey,
        content: TicketContent,
    ) -> Result<(), TicketError> {
        let kind = if self.new_tickets.contains_key(key) {
            TicketKind::Issue
        } else {
            self.tickets
                .get(key)
                .map(Ticket::kind)
                .ok_or_else(|| TicketError::TicketNotFound(key.clone()))?
        };
        if kind != content.kind() {
            return Err(TicketError::ContentMismatch {
                key: key.clone(),
                expected: kind,
                found: content.kind(),
            });
        }

        self.promote(key);
        let ticket = self
            .tickets
            .get_mut(key)
            .ok_or_else(|| TicketError::TicketNotFound(key.clone()))?;
        ticket.modify_proposal(content)?;

        tracing::info!("modified {}", key);
        self.dispatcher.dispatch(&TicketEvent::modified(key.clone()));
        Ok(())
    }

    /// A ticket in the approved-or-pending set.
    pub fn get(&self, key: &TicketKey) -> Option<&Ticket> {
        self.tickets.get(key)
    }

    /// Mutable access for staging proposals on a registered ticket.
    pub fn get_mut(&mut self, key: &TicketKey) -> Option<&mut Ticket> {
        self.tickets.get_mut(key)
    }

    /// An issue proposed for creation.
    pub fn new_ticket(&self, key: &TicketKey) -> Option<&Issue> {
        self.new_tickets.get(key)
    }

    pub fn contains(&self, key: &TicketKey) -> bool {
        self.tickets.contains_key(key) || self.new_tickets.contains_key(key)
    }

    pub fn is_new(&self, key: &TicketKey) -> bool {
        self.new_tickets.contains_key(key)
    }

    pub fn tickets(&self) -> impl Iterator<Item = &Ticket> {
        self.tickets.values()
    }

    pub fn new_tickets(&self) -> impl Iterator<Item = &Issue> {
        self.new_tickets.values()
    }

    /// Ids of every registered ticket, including new issues.
    ///
    /// Seed an [`IdAllocator`](crate::IdAllocator) with these so new tickets
    /// cannot collide with registered ones.
    pub fn ids(&self) -> impl Iterator<Item = TicketId> + '_ {
        self.tickets
            .values()
            .map(Ticket::id)
            .chain(self.new_tickets.values().map(Issue::id))
    }

    /// Keys with a decision outstanding: pending tickets, then new issues.
    pub fn pending(&self) -> Vec<&TicketKey> {
        self.tickets
            .iter()
            .filter(|(_, ticket)| ticket.is_pending())
            .map(|(key, _)| key)
            .chain(self.new_tickets.keys())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tickets.len() + self.new_tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty() && self.new_tickets.is_empty()
    }

    /// Move a new issue into `tickets`, if it is one.
    fn promote(&mut self, key: &TicketKey) {
        if let Some(issue) = self.new_tickets.remove(key) {
            self.tickets.insert(key.clone(), Ticket::Issue(issue));
        }
    }
}

impl fmt::Display for ApprovalHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tickets:")?;
        for ticket in self.tickets.values() {
            write!(f, "{ticket}")?;
        }
        writeln!(f, "New Tickets:")?;
        for issue in self.new_tickets.values() {
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epic::{Epic, EpicState};
    use crate::id::{IdAllocator, TicketId};
    use crate::issue::IssueContent;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn handler_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ApprovalHandler>();
    }

    #[test]
    fn add_routes_by_state() {
        let mut ids = IdAllocator::new();
        let mut handler = ApprovalHandler::new();

        let epic = handler.add_ticket(Epic::new(ids.next_id(), "vision")).unwrap();
        let existing = handler
            .add_ticket(Issue::new(ids.next_id(), "t", "b"))
            .unwrap();
        let proposed = handler
            .add_ticket(Issue::proposed_new(ids.next_id(), "new", "body"))
            .unwrap();

        assert_eq!(epic.as_str(), "epic_0");
        assert!(handler.get(&epic).is_some());
        assert!(handler.get(&existing).is_some());
        assert!(handler.get(&proposed).is_none());
        assert!(handler.is_new(&proposed));
        assert_eq!(handler.len(), 3);
    }

    #[test]
    fn duplicate_key_is_rejected_across_both_mappings() {
        let mut handler = ApprovalHandler::new();
        handler
            .add_ticket(Issue::proposed_new(TicketId(1), "a", "b"))
            .unwrap();
        let err = handler
            .add_ticket(Issue::new(TicketId(1), "c", "d"))
            .unwrap_err();
        assert!(matches!(err, TicketError::DuplicateTicket(ref key) if key.as_str() == "issue_1"));

        // Same id, different kind, is a different key.
        handler.add_ticket(Epic::new(TicketId(1), "e")).unwrap();
    }

    #[test]
    fn ids_cover_registered_and_new_issues() {
        let mut handler = ApprovalHandler::new();
        handler.add_ticket(Epic::new(TicketId(0), "e")).unwrap();
        handler.add_ticket(Issue::new(TicketId(4), "a", "b")).unwrap();
        handler
            .add_ticket(Issue::proposed_new(TicketId(9), "c", "d"))
            .unwrap();

        let mut ids: Vec<TicketId> = handler.ids().collect();
        ids.sort();
        assert_eq!(ids, vec![TicketId(0), TicketId(4), TicketId(9)]);
        assert_eq!(IdAllocator::after(handler.ids()).peek(), TicketId(10));
    }

    #[test]
    fn removing_one_leaves_the_other() {
        let mut handler = ApprovalHandler::new();
        let a = handler.add_ticket(Epic::new(TicketId(0), "a")).unwrap();
        let b = handler.add_ticket(Epic::new(TicketId(1), "b")).unwrap();

        let removed = handler.remove_ticket(&a).unwrap();
        assert_eq!(removed.id(), TicketId(0));
        assert!(handler.get(&a).is_none());
        assert_eq!(
            handler.get(&b).and_then(Ticket::as_epic).map(Epic::content),
            Some("b")
        );
    }

    #[test]
    fn remove_finds_new_issues_and_fails_when_absent_everywhere() {
        let mut handler = ApprovalHandler::new();
        let key = handler
            .add_ticket(Issue::proposed_new(TicketId(3), "a", "b"))
            .unwrap();

        assert!(handler.remove_ticket(&key).is_ok());
        assert!(!handler.contains(&key));
        assert!(matches!(
            handler.remove_ticket(&key),
            Err(TicketError::TicketNotFound(_))
        ));
    }

    #[test]
    fn approving_new_issue_moves_it_into_tickets() {
        let mut handler = ApprovalHandler::new();
        let key = handler
            .add_ticket(Issue::proposed_new(TicketId(2), "Add SSO", "Support SAML"))
            .unwrap();

        assert_eq!(handler.approve_ticket(&key).unwrap(), Resolution::Retained);
        assert!(!handler.is_new(&key));
        let issue = handler.get(&key).and_then(Ticket::as_issue).unwrap();
        assert_eq!(issue.state(), IssueState::Approved);
        assert_eq!(issue.current_content(), &IssueContent::new("Add SSO", "Support SAML"));
    }

    #[test]
    fn rejecting_new_issue_leaves_it_nowhere() {
        let mut handler = ApprovalHandler::new();
        let key = handler
            .add_ticket(Issue::proposed_new(TicketId(2), "a", "b"))
            .unwrap();

        assert_eq!(handler.reject_ticket(&key).unwrap(), Resolution::Discarded);
        assert!(!handler.contains(&key));
        assert!(handler.is_empty());
    }

    #[test]
    fn modifying_new_issue_promotes_it_with_reviewer_content() {
        let mut handler = ApprovalHandler::new();
        let key = handler
            .add_ticket(Issue::proposed_new(TicketId(2), "llm", "llm"))
            .unwrap();

        handler
            .modify_ticket(&key, TicketContent::issue("human", "human body"))
            .unwrap();
        assert!(!handler.is_new(&key));
        let issue = handler.get(&key).and_then(Ticket::as_issue).unwrap();
        assert_eq!(issue.title(), "human");
        assert_eq!(issue.state(), IssueState::Approved);
    }

    #[test]
    fn modify_with_wrong_kind_does_not_promote() {
        let mut handler = ApprovalHandler::new();
        let key = handler
            .add_ticket(Issue::proposed_new(TicketId(2), "a", "b"))
            .unwrap();

        let err = handler
            .modify_ticket(&key, TicketContent::epic("nope"))
            .unwrap_err();
        assert!(matches!(err, TicketError::ContentMismatch { .. }));
        assert!(handler.is_new(&key));
    }

    #[test]
    fn approved_delete_drops_the_issue() {
        let mut handler = ApprovalHandler::new();
        let key = handler.add_ticket(Issue::new(TicketId(5), "t", "b")).unwrap();
        handler
            .get_mut(&key)
            .and_then(Ticket::as_issue_mut)
            .unwrap()
            .propose_delete();

        assert_eq!(handler.approve_ticket(&key).unwrap(), Resolution::Discarded);
        assert!(!handler.contains(&key));
    }

    #[test]
    fn epic_update_is_approved_in_place() {
        let mut handler = ApprovalHandler::new();
        let key = handler.add_ticket(Epic::new(TicketId(0), "v1")).unwrap();
        handler
            .get_mut(&key)
            .and_then(Ticket::as_epic_mut)
            .unwrap()
            .propose_update("v2");
        assert_eq!(handler.pending(), vec![&key]);

        handler.approve_ticket(&key).unwrap();
        let epic = handler.get(&key).and_then(Ticket::as_epic).unwrap();
        assert_eq!(epic.content(), "v2");
        assert_eq!(epic.state(), EpicState::Approved);
        assert!(handler.pending().is_empty());

        // Nothing pending now.
        assert!(matches!(
            handler.reject_ticket(&key),
            Err(TicketError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn operations_on_unknown_keys_fail() {
        let mut handler = ApprovalHandler::new();
        let key = TicketKey::epic(TicketId(99));
        assert!(matches!(
            handler.approve_ticket(&key),
            Err(TicketError::TicketNotFound(_))
        ));
        assert!(matches!(
            handler.reject_ticket(&key),
            Err(TicketError::TicketNotFound(_))
        ));
        assert!(matches!(
            handler.modify_ticket(&key, TicketContent::epic("x")),
            Err(TicketError::TicketNotFound(_))
        ));
    }

    #[test]
    fn handler_emits_events_to_sinks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let mut handler = ApprovalHandler::new();
        handler.add_sink(Box::new(crate::events::LogSink::new(&path)));

        let key = handler
            .add_ticket(Issue::proposed_new(TicketId(1), "a", "b"))
            .unwrap();
        handler.approve_ticket(&key).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let types: Vec<String> = content
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).unwrap();
                value["event_type"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(types, vec!["ticket_added", "proposal_accepted"]);
    }
}
