use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a text element within one editing session.
///
/// Ids are handed out by an [`IdCounter`] and never reused, even after the
/// element they named is deleted. `0` is reserved for "not yet assigned".
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl ElementId {
    pub const UNASSIGNED: ElementId = ElementId(0);

    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id source for a session.
#[derive(Debug, Clone)]
pub struct IdCounter {
    next: u64,
}

impl Default for IdCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl IdCounter {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Seed the counter from `max(existing) + 1`.
    pub fn seeded_from(ids: impl IntoIterator<Item = ElementId>) -> Self {
        let mut counter = Self::new();
        for id in ids {
            counter.observe(id);
        }
        counter
    }

    /// Make sure `id` can never be handed out again.
    pub fn observe(&mut self, id: ElementId) {
        if id.0 >= self.next {
            self.next = id.0 + 1;
        }
    }

    /// Allocate the next id.
    pub fn next_id(&mut self) -> ElementId {
        let id = ElementId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call to `next_id` will return.
    pub fn peek(&self) -> ElementId {
        ElementId(self.next)
    }
}
