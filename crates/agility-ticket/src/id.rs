// id.rs - Ticket identifiers and the allocator that hands them out.
//
// Ids are plain integers. There is no global counter: whoever composes the
// system owns an IdAllocator and passes it to whatever creates tickets, so
// two allocators can hand out the same number.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer identity of a ticket, unique per allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub u64);

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TicketId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Monotonic id source.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Allocator whose first id is 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocator whose first id is `first`.
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Allocator that continues after the highest of `ids`.
    ///
    /// Used when tickets arrive from outside (e.g. flat records) and new
    /// ones must not collide with them. Saturates at `u64::MAX`.
    pub fn after<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = TicketId>,
    {
        let next = ids.into_iter().map(|id| id.0.saturating_add(1)).max().unwrap_or(0);
        Self { next }
    }

    /// Hand out the next id.
    ///
    /// Once `u64::MAX` is reached it is returned again; registering such a
    /// ticket twice fails with `DuplicateTicket`.
    pub fn next_id(&mut self) -> TicketId {
        let id = TicketId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }

    /// The id the next call to [`next_id`](Self::next_id) will return.
    pub fn peek(&self) -> TicketId {
        TicketId(self.next)
    }
}
