//! Snapshot-based undo/redo.
//!
//! The history is an append-only list of immutable element-list snapshots
//! plus a cursor. Committing truncates any forward branch past the cursor;
//! undo and redo only move the cursor.
//!
//! Continuous gestures are wrapped in a **batch**: while a batch is open,
//! commits are deferred, and closing the outermost batch pushes a single
//! snapshot if the list actually changed.

use crate::model::TextElement;
use std::sync::Arc;

/// An immutable copy of the full element list.
pub type Snapshot = Arc<[TextElement]>;

#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Snapshot>,
    cursor: usize,
    /// Maximum number of snapshots kept; the oldest is evicted first.
    max_depth: Option<usize>,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
}

impl History {
    pub fn new(initial: &[TextElement]) -> Self {
        Self {
            snapshots: vec![Arc::from(initial)],
            cursor: 0,
            max_depth: None,
            batch_depth: 0,
        }
    }

    pub fn with_limit(initial: &[TextElement], max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth.max(1)),
            ..Self::new(initial)
        }
    }

    /// Record `elements` as the newest state. Returns whether a snapshot was
    /// appended (it is not while a batch is open).
    pub fn commit(&mut self, elements: &[TextElement]) -> bool {
        if self.batch_depth > 0 {
            return false;
        }
        self.push(Arc::from(elements));
        true
    }

    fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(snapshot);
        self.cursor = self.snapshots.len() - 1;

        if let Some(max) = self.max_depth {
            while self.snapshots.len() > max {
                self.snapshots.remove(0);
                self.cursor -= 1;
            }
        }
        log::debug!("history commit: {} snapshots, cursor {}", self.snapshots.len(), self.cursor);
    }

    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    /// Close a batch. When the outermost batch closes and `elements` differ
    /// from the last committed snapshot, one snapshot is pushed.
    pub fn end_batch(&mut self, elements: &[TextElement]) -> bool {
        if self.batch_depth == 0 {
            return false;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 || self.current().as_ref() == elements {
            return false;
        }
        self.push(Arc::from(elements));
        true
    }

    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    /// Step back. No-op at the oldest snapshot or while a batch is open.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if self.batch_depth > 0 || self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        log::debug!("undo → cursor {}", self.cursor);
        Some(self.current().clone())
    }

    /// Step forward. No-op at the newest snapshot or while a batch is open.
    pub fn redo(&mut self) -> Option<Snapshot> {
        if self.batch_depth > 0 || self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        log::debug!("redo → cursor {}", self.cursor);
        Some(self.current().clone())
    }

    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Drop everything and start over from `initial`.
    pub fn reset(&mut self, initial: &[TextElement]) {
        self.snapshots = vec![Arc::from(initial)];
        self.cursor = 0;
        self.batch_depth = 0;
    }
}
