// events.rs - Ticket events and notification dispatch.
//
// The approval handler emits an event for every registry mutation and every
// resolved proposal. Sinks (a JSONL log, a UI feed) subscribe through the
// dispatcher. A failing sink is logged and never fails the handler call.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TicketError;
use crate::ticket::TicketKey;

/// Events emitted by the approval handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum TicketEvent {
    /// A ticket was registered. `state` is the state it was registered in.
    TicketAdded {
        key: TicketKey,
        state: String,
        timestamp: DateTime<Utc>,
    },

    /// A ticket was removed from the registry by request.
    TicketRemoved {
        key: TicketKey,
        timestamp: DateTime<Utc>,
    },

    /// A pending proposal was accepted and the ticket is approved.
    ProposalAccepted {
        key: TicketKey,
        timestamp: DateTime<Utc>,
    },

    /// A pending proposal was rejected; the ticket keeps its content.
    ProposalRejected {
        key: TicketKey,
        timestamp: DateTime<Utc>,
    },

    /// A decision made the ticket cease to exist (accepted delete,
    /// rejected add).
    TicketDiscarded {
        key: TicketKey,
        timestamp: DateTime<Utc>,
    },

    /// A reviewer replaced the content by hand.
    TicketModified {
        key: TicketKey,
        timestamp: DateTime<Utc>,
    },
}

impl TicketEvent {
    pub fn event_type(&self) -> &str {
        match self {
            TicketEvent::TicketAdded { .. } => "ticket_added",
            TicketEvent::TicketRemoved { .. } => "ticket_removed",
            TicketEvent::ProposalAccepted { .. } => "proposal_accepted",
            TicketEvent::ProposalRejected { .. } => "proposal_rejected",
            TicketEvent::TicketDiscarded { .. } => "ticket_discarded",
            TicketEvent::TicketModified { .. } => "ticket_modified",
        }
    }

    pub fn key(&self) -> &TicketKey {
        match self {
            TicketEvent::TicketAdded { key, .. }
            | TicketEvent::TicketRemoved { key, .. }
            | TicketEvent::ProposalAccepted { key, .. }
            | TicketEvent::ProposalRejected { key, .. }
            | TicketEvent::TicketDiscarded { key, .. }
            | TicketEvent::TicketModified { key, .. } => key,
        }
    }

    pub fn added(key: TicketKey, state: &str) -> Self {
        TicketEvent::TicketAdded {
            key,
            state: state.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn removed(key: TicketKey) -> Self {
        TicketEvent::TicketRemoved {
            key,
            timestamp: Utc::now(),
        }
    }

    pub fn accepted(key: TicketKey) -> Self {
        TicketEvent::ProposalAccepted {
            key,
            timestamp: Utc::now(),
        }
    }

    pub fn rejected(key: TicketKey) -> Self {
        TicketEvent::ProposalRejected {
            key,
            timestamp: Utc::now(),
        }
    }

    pub fn discarded(key: TicketKey) -> Self {
        TicketEvent::TicketDiscarded {
            key,
            timestamp: Utc::now(),
        }
    }

    pub fn modified(key: TicketKey) -> Self {
        TicketEvent::TicketModified {
            key,
            timestamp: Utc::now(),
        }
    }
}

/// Receives ticket events.
pub trait NotificationSink: Send {
    /// Handle an event. Errors are logged by the dispatcher.
    fn send(&self, event: &TicketEvent) -> Result<(), TicketError>;
}

/// Appends events as JSON lines to a file.
pub struct LogSink {
    path: PathBuf,
}

impl LogSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl NotificationSink for LogSink {
    fn send(&self, event: &TicketEvent) -> Result<(), TicketError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| TicketError::IoError {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| TicketError::IoError {
                path: self.path.display().to_string(),
                source,
            })?;

        let json = serde_json::to_string(event)?;
        writeln!(file, "{}", json).map_err(|source| TicketError::IoError {
            path: self.path.display().to_string(),
            source,
        })?;

        Ok(())
    }
}

/// Fans events out to every registered sink.
pub struct EventDispatcher {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn dispatch(&self, event: &TicketEvent) {
        for sink in &self.sinks {
            if let Err(e) = sink.send(event) {
                tracing::warn!("notification sink error for {}: {}", event.key(), e);
            }
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
