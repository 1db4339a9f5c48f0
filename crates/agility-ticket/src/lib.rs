//! # agility-ticket
//!
//! Ticket state machine and approval workflow for Agility.
//!
//! An LLM proposes changes to project tickets; a human decides. This crate
//! holds the tickets and enforces how those decisions move them between
//! states.
//!
//! ## Key components
//!
//! - [`Ticket`]: tagged variant over [`Epic`] (APPROVED/UPDATE) and
//!   [`Issue`] (APPROVED/UPDATE/DELETE/ADD)
//! - [`IdAllocator`]: explicit source of ticket ids
//! - [`ApprovalHandler`]: registry of approved and newly proposed tickets,
//!   with add/remove/approve/reject/modify
//! - [`EpicRecord`] / [`IssueRecord`]: flat record shapes for older consumers
//! - [`TicketEvent`] / [`EventDispatcher`]: lifecycle notifications
//!
//! ```rust
//! use agility_ticket::{ApprovalHandler, Epic, IdAllocator, Ticket};
//!
//! let mut ids = IdAllocator::new();
//! let mut handler = ApprovalHandler::new();
//! let key = handler.add_ticket(Epic::new(ids.next_id(), "Ship MFA")).unwrap();
//!
//! if let Some(epic) = handler.get_mut(&key).and_then(Ticket::as_epic_mut) {
//!     epic.propose_update("Ship MFA for every platform");
//! }
//! handler.approve_ticket(&key).unwrap();
//! ```

pub mod approval;
pub mod epic;
pub mod error;
pub mod events;
pub mod id;
pub mod issue;
pub mod record;
pub mod ticket;

pub use approval::ApprovalHandler;
pub use epic::{Epic, EpicContent, EpicState};
pub use error::TicketError;
pub use events::{EventDispatcher, LogSink, NotificationSink, TicketEvent};
pub use id::{IdAllocator, TicketId};
pub use issue::{Issue, IssueContent, IssueState, ProposalAction};
pub use record::{EpicRecord, IssueRecord};
pub use ticket::{Resolution, Ticket, TicketContent, TicketKey, TicketKind};
