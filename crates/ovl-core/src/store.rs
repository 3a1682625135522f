//! The element store: ordered element list, exclusive selection, id counter,
//! and the history every committed mutation is pushed to.
//!
//! Two update paths exist on purpose. `preview_update` changes the working
//! list only and is what continuous gestures call every frame;
//! `commit_update` (alias `update`) also records a snapshot. Gestures open a
//! history batch with `begin_gesture` so the whole gesture lands as one
//! snapshot at `end_gesture`.

use crate::error::CoreError;
use crate::history::{History, Snapshot};
use crate::id::{ElementId, IdCounter};
use crate::model::{ElementPatch, TextElement};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct ElementStore {
    elements: Vec<TextElement>,
    selected: Option<ElementId>,
    ids: IdCounter,
    history: History,
    /// Set while an export walks a snapshot of the list.
    frozen: bool,
}

impl Default for ElementStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementStore {
    pub fn new() -> Self {
        Self::load(Vec::new(), None)
    }

    /// Build a store from an externally supplied list.
    ///
    /// The id counter is seeded past the largest id present. Elements without
    /// an id, or repeating an id seen earlier in the list, get a fresh one.
    pub fn load(elements: Vec<TextElement>, history_limit: Option<usize>) -> Self {
        let mut ids = IdCounter::seeded_from(elements.iter().map(|e| e.id));
        let mut seen = HashSet::new();
        let elements: Vec<TextElement> = elements
            .into_iter()
            .map(|mut el| {
                if !el.id.is_assigned() || !seen.insert(el.id) {
                    el.id = ids.next_id();
                    seen.insert(el.id);
                }
                el.sanitize();
                el
            })
            .collect();

        let history = match history_limit {
            Some(limit) => History::with_limit(&elements, limit),
            None => History::new(&elements),
        };
        log::debug!("store loaded with {} elements, next id {}", elements.len(), ids.peek());

        Self {
            elements,
            selected: None,
            ids,
            history,
            frozen: false,
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Elements in paint order (bottom first).
    pub fn elements(&self) -> &[TextElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Option<&TextElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    pub fn selected_id(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&TextElement> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selected == Some(id)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn select(&mut self, id: ElementId) -> Result<(), CoreError> {
        if self.index_of(id).is_none() {
            return Err(CoreError::UnknownElement(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    fn ensure_mutable(&self) -> Result<(), CoreError> {
        if self.frozen {
            return Err(CoreError::ExportInFlight);
        }
        Ok(())
    }

    fn commit(&mut self) {
        self.history.commit(&self.elements);
    }

    fn index_or_err(&self, id: ElementId) -> Result<usize, CoreError> {
        self.index_of(id).ok_or(CoreError::UnknownElement(id))
    }

    /// Reserve a fresh id without adding anything.
    pub fn allocate_id(&mut self) -> ElementId {
        self.ids.next_id()
    }

    /// Append on top and select it. Unassigned or already-issued ids are
    /// replaced from the counter.
    pub fn add(&mut self, mut element: TextElement) -> Result<ElementId, CoreError> {
        self.ensure_mutable()?;
        self.claim_id(&mut element);
        element.sanitize();
        let id = element.id;
        self.elements.push(element);
        self.selected = Some(id);
        self.commit();
        log::debug!("added element {id}");
        Ok(id)
    }

    /// Append a batch on top as one history entry; the first becomes selected.
    pub fn extend(&mut self, elements: Vec<TextElement>) -> Result<Vec<ElementId>, CoreError> {
        self.ensure_mutable()?;
        if elements.is_empty() {
            return Ok(Vec::new());
        }
        let mut added = Vec::with_capacity(elements.len());
        for mut element in elements {
            self.claim_id(&mut element);
            element.sanitize();
            added.push(element.id);
            self.elements.push(element);
        }
        self.selected = added.first().copied();
        self.commit();
        log::debug!("added {} elements in one batch", added.len());
        Ok(added)
    }

    /// Keep a caller id only if the counter has never reached it, so ids of
    /// deleted elements are not handed out again.
    fn claim_id(&mut self, element: &mut TextElement) {
        if !element.id.is_assigned() || element.id < self.ids.peek() {
            element.id = self.ids.next_id();
        } else {
            self.ids.observe(element.id);
        }
    }

    pub fn remove(&mut self, id: ElementId) -> Result<TextElement, CoreError> {
        self.ensure_mutable()?;
        let index = self.index_or_err(id)?;
        let removed = self.elements.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.commit();
        log::debug!("removed element {id}");
        Ok(removed)
    }

    /// Merge `patch` into the element and commit a snapshot.
    pub fn update(&mut self, id: ElementId, patch: &ElementPatch) -> Result<(), CoreError> {
        self.commit_update(id, patch)
    }

    pub fn commit_update(&mut self, id: ElementId, patch: &ElementPatch) -> Result<(), CoreError> {
        self.preview_update(id, patch)?;
        self.commit();
        Ok(())
    }

    /// Merge `patch` into the working list without touching history.
    pub fn preview_update(&mut self, id: ElementId, patch: &ElementPatch) -> Result<(), CoreError> {
        self.ensure_mutable()?;
        let index = self.index_or_err(id)?;
        patch.apply(&mut self.elements[index]);
        Ok(())
    }

    /// Move the element at `from` so it ends up at index `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), CoreError> {
        self.ensure_mutable()?;
        let len = self.elements.len();
        for index in [from, to] {
            if index >= len {
                return Err(CoreError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }
        let element = self.elements.remove(from);
        self.elements.insert(to, element);
        self.commit();
        log::debug!("reordered layer {from} → {to}");
        Ok(())
    }

    /// Bring one step toward the top. Returns `false` if already on top.
    pub fn raise(&mut self, id: ElementId) -> Result<bool, CoreError> {
        let index = self.index_or_err(id)?;
        if index + 1 >= self.elements.len() {
            return Ok(false);
        }
        self.reorder(index, index + 1)?;
        Ok(true)
    }

    /// Send one step toward the bottom. Returns `false` if already at bottom.
    pub fn lower(&mut self, id: ElementId) -> Result<bool, CoreError> {
        let index = self.index_or_err(id)?;
        if index == 0 {
            return Ok(false);
        }
        self.reorder(index, index - 1)?;
        Ok(true)
    }

    // ─── Gestures & history ──────────────────────────────────────────────

    pub fn begin_gesture(&mut self) {
        self.history.begin_batch();
    }

    /// Close the gesture; returns whether it produced a history entry.
    pub fn end_gesture(&mut self) -> bool {
        self.history.end_batch(&self.elements)
    }

    pub fn in_gesture(&self) -> bool {
        self.history.in_batch()
    }

    pub fn undo(&mut self) -> Result<bool, CoreError> {
        self.ensure_mutable()?;
        Ok(match self.history.undo() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        })
    }

    pub fn redo(&mut self) -> Result<bool, CoreError> {
        self.ensure_mutable()?;
        Ok(match self.history.redo() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        })
    }

    /// Replace the working list with a snapshot. Selection survives only if
    /// the selected id still exists.
    fn restore(&mut self, snapshot: Snapshot) {
        self.elements = snapshot.to_vec();
        if let Some(id) = self.selected {
            if self.index_of(id).is_none() {
                self.selected = None;
            }
        }
    }

    // ─── Export freeze ───────────────────────────────────────────────────

    /// Freeze the list and hand back a copy to iterate.
    pub fn freeze(&mut self) -> Result<Vec<TextElement>, CoreError> {
        self.ensure_mutable()?;
        self.frozen = true;
        Ok(self.elements.clone())
    }

    pub fn thaw(&mut self) {
        self.frozen = false;
    }
}
