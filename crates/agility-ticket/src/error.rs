// error.rs - Error types for the ticket lifecycle subsystem.

use thiserror::Error;

use crate::id::TicketId;
use crate::ticket::{TicketKey, TicketKind};

/// Errors that can occur during ticket and approval operations.
#[derive(Debug, Error)]
pub enum TicketError {
    /// `add_ticket` was called with a key that is already registered.
    #[error("ticket {0} already exists")]
    DuplicateTicket(TicketKey),

    /// The key is not present in the mapping(s) the operation looks in.
    #[error("ticket {0} not found")]
    TicketNotFound(TicketKey),

    /// Accept or reject was called with nothing pending.
    #[error("cannot {action} proposal for {kind} {id} in state {state}")]
    InvalidStateTransition {
        kind: TicketKind,
        id: TicketId,
        state: String,
        action: &'static str,
    },

    /// Reviewer content does not match the ticket's kind.
    #[error("ticket {key} is an {expected}, got {found} content")]
    ContentMismatch {
        key: TicketKey,
        expected: TicketKind,
        found: TicketKind,
    },

    /// A flat record could not be read back into a ticket.
    #[error("invalid record for {kind} {id}: {reason}")]
    InvalidRecord {
        kind: TicketKind,
        id: TicketId,
        reason: String,
    },

    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: String,
        source: std::io::Error,
    },

    /// Failed to serialize ticket data.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
