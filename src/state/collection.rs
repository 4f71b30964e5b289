//! Local mirror of one server-side collection.
//!
//! DESIGN
//! ======
//! A transition is split in two: `begin` hands out a [`Ticket`] before the
//! network call, and one of the `complete_*`/`abort` methods consumes it
//! afterwards. The split is what lets the collection
//! - refuse a second transition while one is in flight, and
//! - drop a late response whose ticket predates [`Collection::unmount`].
//!
//! After a successful mutation the collection is reconciled against that one
//! record; it is never re-fetched to reflect a single change.

#[cfg(test)]
#[path = "collection_test.rs"]
mod collection_test;

use std::fmt;

use crate::error::ControllerError;
use crate::net::Resource;

/// Where a collection is in its fetch/mutate cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Saving,
    Deleting,
}

impl Phase {
    /// A request is outstanding.
    #[must_use]
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Loading | Self::Saving | Self::Deleting)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Saving => "saving",
            Self::Deleting => "deleting",
        })
    }
}

/// Proof that a transition was started. Only the most recent ticket of a
/// mounted collection is honoured, and only once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    phase: Phase,
}

impl Ticket {
    #[must_use]
    pub fn phase(self) -> Phase {
        self.phase
    }
}

/// What happened to a completed transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconciled {
    Applied,
    /// The ticket was stale (view unmounted); local state was not touched.
    Discarded,
}

#[derive(Debug)]
pub struct Collection<R> {
    items: Vec<R>,
    phase: Phase,
    generation: u64,
    mounted: bool,
}

impl<R> Default for Collection<R> {
    fn default() -> Self {
        Self { items: Vec::new(), phase: Phase::Idle, generation: 0, mounted: true }
    }
}

impl<R: Resource> Collection<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[R] {
        &self.items
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&R> {
        self.items.iter().find(|r| r.id() == Some(id))
    }

    /// Start a transition into `phase`.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Busy`] while another transition is in
    /// flight and [`ControllerError::Unmounted`] after teardown.
    pub fn begin(&mut self, phase: Phase) -> Result<Ticket, ControllerError> {
        debug_assert!(phase.is_busy());
        if !self.mounted {
            return Err(ControllerError::Unmounted);
        }
        if self.phase.is_busy() {
            return Err(ControllerError::Busy { phase: self.phase });
        }
        self.generation = self.generation.wrapping_add(1);
        self.phase = phase;
        Ok(Ticket { generation: self.generation, phase })
    }

    fn accepts(&self, ticket: Ticket) -> bool {
        self.mounted && self.phase.is_busy() && ticket.generation == self.generation
    }

    /// Settle `ticket` and run `apply` if it is still current.
    fn settle(&mut self, ticket: Ticket, apply: impl FnOnce(&mut Vec<R>)) -> Reconciled {
        if !self.accepts(ticket) {
            return Reconciled::Discarded;
        }
        apply(&mut self.items);
        self.phase = Phase::Ready;
        Reconciled::Applied
    }

    /// Replace the whole collection with a fresh listing.
    pub fn complete_list(&mut self, ticket: Ticket, items: Vec<R>) -> Reconciled {
        self.settle(ticket, |local| *local = items)
    }

    /// Put the server's copy of a new record at the head.
    pub fn complete_create(&mut self, ticket: Ticket, record: R) -> Reconciled {
        self.settle(ticket, |local| prepend_unique(local, record))
    }

    /// Swap in the server's copy of record `id`, keeping its position.
    pub fn complete_update(&mut self, ticket: Ticket, id: &str, record: R) -> Reconciled {
        self.settle(ticket, |local| {
            replace_by_id(local, id, record);
        })
    }

    /// Drop record `id`.
    pub fn complete_delete(&mut self, ticket: Ticket, id: &str) -> Reconciled {
        self.settle(ticket, |local| {
            remove_by_id(local, id);
        })
    }

    /// The server accepted a change that only a fresh listing will show.
    pub fn complete_unchanged(&mut self, ticket: Ticket) -> Reconciled {
        self.settle(ticket, |_| {})
    }

    /// The request failed: return to `Ready` with local state untouched.
    pub fn abort(&mut self, ticket: Ticket) -> Reconciled {
        self.settle(ticket, |_| {})
    }

    /// Tear the view down. Every outstanding ticket becomes stale.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.generation = self.generation.wrapping_add(1);
    }
}

// =============================================================================
// RECONCILIATION
// =============================================================================

/// Insert `record` first, dropping any older copy with the same identity.
pub fn prepend_unique<R: Resource>(items: &mut Vec<R>, record: R) {
    if let Some(id) = record.id() {
        items.retain(|r| r.id() != Some(id));
    }
    items.insert(0, record);
}

/// Replace the record with identity `id` in place. Returns whether one was found.
pub fn replace_by_id<R: Resource>(items: &mut [R], id: &str, record: R) -> bool {
    match items.iter_mut().find(|r| r.id() == Some(id)) {
        Some(slot) => {
            *slot = record;
            true
        }
        None => false,
    }
}

/// Remove every record with identity `id`. Returns whether any was removed.
pub fn remove_by_id<R: Resource>(items: &mut Vec<R>, id: &str) -> bool {
    let before = items.len();
    items.retain(|r| r.id() != Some(id));
    items.len() != before
}
