//! Reversible edit commands and the undo/redo ledger.

use crate::ids::ObjectId;
use crate::objects::PageObject;
use crate::page::PageStore;
use crate::surface::Surface;

/// Payload of one reversible edit.
///
/// Modify stores a full before/after replacement rather than a field-level
/// diff: the replay primitive stays uniform across all three kinds, at the
/// cost of losing object-internal transient state across undo.
#[derive(Debug, Clone, PartialEq)]
pub enum EditKind {
    /// Pure creation; undone by removing the ids.
    Add { after: Vec<PageObject> },
    /// Pure deletion; undone by restoring the prior state.
    Remove { before: Vec<PageObject> },
    /// In-place change, stored as a full replacement.
    Modify {
        before: Vec<PageObject>,
        after: Vec<PageObject>,
    },
}

/// One reversible edit, tagged with the page it occurred on.
#[derive(Debug, Clone, PartialEq)]
pub struct EditEntry {
    /// Identities of the affected objects, positionally paired with the state
    /// vectors in `kind`.
    pub ids: Vec<ObjectId>,
    /// Index of the page the edit occurred on.
    pub page: usize,
    pub kind: EditKind,
}

/// Whether the ledger is currently replaying a recorded entry.
///
/// Recording entry points are no-ops while `Replaying`, so a mutation
/// triggered by replay can never re-enter the ledger as a new entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplayState {
    #[default]
    Idle,
    Replaying,
}

/// Records reversible commands and replays them against the page store.
#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    /// Chronological edits.
    undo_stack: Vec<EditEntry>,
    /// Edits undone and available for replay; cleared by any new edit.
    redo_stack: Vec<EditEntry>,
    state: ReplayState,
    /// Snapshot of the active selection, kept so a later modification still
    /// has access to the pre-modification state.
    captured_selection: Option<Vec<PageObject>>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn is_replaying(&self) -> bool {
        self.state == ReplayState::Replaying
    }

    /// Drop all recorded entries and the selection memento.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.captured_selection = None;
    }

    /// Record the creation of `objects` on `page`.
    ///
    /// Every object must already carry an assigned identity.
    pub fn record_add(&mut self, page: usize, objects: &[PageObject]) {
        if self.is_replaying() || objects.is_empty() {
            return;
        }
        let ids = objects.iter().map(PageObject::id).collect();
        self.push(EditEntry {
            ids,
            page,
            kind: EditKind::Add {
                after: objects.to_vec(),
            },
        });
    }

    /// Record the deletion of `objects` from `page` as one entry.
    pub fn record_remove(&mut self, page: usize, objects: &[PageObject]) {
        if self.is_replaying() || objects.is_empty() {
            return;
        }
        let ids = objects.iter().map(PageObject::id).collect();
        self.push(EditEntry {
            ids,
            page,
            kind: EditKind::Remove {
                before: objects.to_vec(),
            },
        });
    }

    /// Store a snapshot of the newly activated selection so a later
    /// modification has a before-state to diff against.
    pub fn capture_selection(&mut self, objects: Vec<PageObject>) {
        if self.is_replaying() {
            return;
        }
        self.captured_selection = if objects.is_empty() {
            None
        } else {
            Some(objects)
        };
    }

    /// Record an in-place modification of the captured selection.
    ///
    /// `objects` holds the post-modification state; the memento provides the
    /// before-state, pairing entries positionally by identity. Without a
    /// memento, or when the live set no longer matches it, there is nothing
    /// sound to diff against and the edit is skipped.
    pub fn record_modify(&mut self, page: usize, objects: &[PageObject]) {
        if self.is_replaying() || objects.is_empty() {
            return;
        }
        let Some(before) = self.captured_selection.take() else {
            log::warn!("modification reported with no captured selection; skipping");
            return;
        };
        let after: Vec<PageObject> = before
            .iter()
            .filter_map(|b| objects.iter().find(|o| o.id() == b.id()).cloned())
            .collect();
        if after.len() != before.len() {
            log::warn!("captured selection no longer matches the modified objects; skipping");
            self.captured_selection = Some(before);
            return;
        }
        let ids = before.iter().map(PageObject::id).collect();
        // Refresh the memento so a follow-up modification diffs against the
        // state it actually started from.
        self.captured_selection = Some(after.clone());
        self.push(EditEntry {
            ids,
            page,
            kind: EditKind::Modify { before, after },
        });
    }

    fn push(&mut self, entry: EditEntry) {
        self.undo_stack.push(entry);
        self.redo_stack.clear();
    }

    /// Revert the most recent edit. Benign no-op on an empty stack.
    pub fn undo(&mut self, pages: &mut PageStore, surface: &mut Surface) -> bool {
        let Some(entry) = self.undo_stack.pop() else {
            return false;
        };
        surface.clear_selection();
        self.captured_selection = None;
        self.state = ReplayState::Replaying;
        pages.load_page(entry.page, surface, true);
        match &entry.kind {
            EditKind::Add { .. } => apply(surface, &entry.ids, None),
            EditKind::Remove { before } => apply(surface, &entry.ids, Some(before)),
            EditKind::Modify { before, .. } => apply(surface, &entry.ids, Some(before)),
        }
        self.state = ReplayState::Idle;
        self.redo_stack.push(entry);
        true
    }

    /// Re-apply the most recently undone edit. Benign no-op on an empty stack.
    pub fn redo(&mut self, pages: &mut PageStore, surface: &mut Surface) -> bool {
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };
        surface.clear_selection();
        self.captured_selection = None;
        self.state = ReplayState::Replaying;
        pages.load_page(entry.page, surface, true);
        match &entry.kind {
            EditKind::Add { after } => apply(surface, &entry.ids, Some(after)),
            EditKind::Remove { .. } => apply(surface, &entry.ids, None),
            EditKind::Modify { after, .. } => apply(surface, &entry.ids, Some(after)),
        }
        self.state = ReplayState::Idle;
        self.undo_stack.push(entry);
        true
    }
}

/// Replay primitive: remove every live object matching `ids`, then, when a
/// state is given, re-add each object with its original identity restored.
///
/// With no state the removal alone is the net effect.
fn apply(surface: &mut Surface, ids: &[ObjectId], state: Option<&[PageObject]>) {
    surface.remove_by_id(ids);
    if let Some(objects) = state {
        for (id, object) in ids.iter().zip(objects) {
            let mut restored = object.clone();
            restored.set_id(*id);
            surface.insert_object(restored);
        }
        surface.request_rerender();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdAllocator;
    use crate::objects::Stroke;
    use kurbo::{Point, Vec2};

    fn stroke(alloc: &mut IdAllocator, x: f64) -> PageObject {
        let mut object = PageObject::Stroke(Stroke::new(vec![
            Point::new(x, 0.0),
            Point::new(x + 10.0, 10.0),
        ]));
        alloc.ensure_id(&mut object);
        object
    }

    fn serialized(surface: &Surface) -> String {
        serde_json::to_string(surface.objects()).unwrap()
    }

    #[test]
    fn undo_redo_inverse_law_for_add() {
        let mut alloc = IdAllocator::new();
        let mut pages = PageStore::new();
        let mut surface = Surface::new();
        let mut history = HistoryLedger::new();
        let before = serialized(&surface);

        let object = stroke(&mut alloc, 0.0);
        history.record_add(pages.current_index(), std::slice::from_ref(&object));
        surface.insert_object(object);
        let after = serialized(&surface);

        assert!(history.undo(&mut pages, &mut surface));
        assert_eq!(serialized(&surface), before);

        assert!(history.redo(&mut pages, &mut surface));
        assert_eq!(serialized(&surface), after);
    }

    #[test]
    fn undo_restores_removed_objects_with_their_ids() {
        let mut alloc = IdAllocator::new();
        let mut pages = PageStore::new();
        let mut surface = Surface::new();
        let mut history = HistoryLedger::new();

        let object = stroke(&mut alloc, 0.0);
        let id = object.id();
        surface.insert_object(object);

        let removed = surface.remove_by_id(&[id]);
        history.record_remove(pages.current_index(), &removed);
        assert!(surface.is_empty());

        assert!(history.undo(&mut pages, &mut surface));
        assert_eq!(surface.len(), 1);
        assert_eq!(surface.objects()[0].id(), id);
    }

    #[test]
    fn modify_replays_full_replacement() {
        let mut alloc = IdAllocator::new();
        let mut pages = PageStore::new();
        let mut surface = Surface::new();
        let mut history = HistoryLedger::new();

        let object = stroke(&mut alloc, 0.0);
        let id = object.id();
        let pristine = object.clone();
        surface.insert_object(object);

        history.capture_selection(vec![pristine.clone()]);
        // Simulate a drag of the selected stroke.
        let mut moved = pristine.clone();
        moved.translate(Vec2::new(25.0, 0.0));
        surface.remove_by_id(&[id]);
        surface.insert_object(moved.clone());
        history.record_modify(pages.current_index(), std::slice::from_ref(&moved));

        assert!(history.undo(&mut pages, &mut surface));
        assert_eq!(surface.objects()[0], pristine);

        assert!(history.redo(&mut pages, &mut surface));
        assert_eq!(surface.objects()[0], moved);
    }

    #[test]
    fn chained_modifies_diff_against_refreshed_memento() {
        let mut alloc = IdAllocator::new();
        let mut pages = PageStore::new();
        let mut surface = Surface::new();
        let mut history = HistoryLedger::new();

        let object = stroke(&mut alloc, 0.0);
        let id = object.id();
        surface.insert_object(object.clone());
        history.capture_selection(vec![object.clone()]);

        let mut once = object.clone();
        once.translate(Vec2::new(10.0, 0.0));
        surface.remove_by_id(&[id]);
        surface.insert_object(once.clone());
        history.record_modify(0, std::slice::from_ref(&once));

        let mut twice = once.clone();
        twice.translate(Vec2::new(10.0, 0.0));
        surface.remove_by_id(&[id]);
        surface.insert_object(twice.clone());
        history.record_modify(0, std::slice::from_ref(&twice));

        // First undo lands on the intermediate state, not the origin.
        assert!(history.undo(&mut pages, &mut surface));
        assert_eq!(surface.objects()[0], once);
        assert!(history.undo(&mut pages, &mut surface));
        assert_eq!(surface.objects()[0], object);
    }

    #[test]
    fn new_edit_clears_redo_stack() {
        let mut alloc = IdAllocator::new();
        let mut pages = PageStore::new();
        let mut surface = Surface::new();
        let mut history = HistoryLedger::new();

        let first = stroke(&mut alloc, 0.0);
        history.record_add(0, std::slice::from_ref(&first));
        surface.insert_object(first);

        assert!(history.undo(&mut pages, &mut surface));
        assert!(history.can_redo());

        let second = stroke(&mut alloc, 50.0);
        history.record_add(0, std::slice::from_ref(&second));
        surface.insert_object(second);

        assert!(!history.can_redo());
        assert!(!history.redo(&mut pages, &mut surface));
    }

    #[test]
    fn empty_stacks_are_benign_noops() {
        let mut pages = PageStore::new();
        let mut surface = Surface::new();
        let mut history = HistoryLedger::new();

        assert!(!history.can_undo());
        assert!(!history.undo(&mut pages, &mut surface));
        assert!(!history.can_redo());
        assert!(!history.redo(&mut pages, &mut surface));
    }

    #[test]
    fn recording_is_suppressed_while_replaying() {
        let mut alloc = IdAllocator::new();
        let mut history = HistoryLedger::new();
        history.state = ReplayState::Replaying;

        let object = stroke(&mut alloc, 0.0);
        history.record_add(0, std::slice::from_ref(&object));
        history.record_remove(0, std::slice::from_ref(&object));
        history.capture_selection(vec![object.clone()]);
        history.record_modify(0, std::slice::from_ref(&object));

        assert!(!history.can_undo());
        assert!(history.captured_selection.is_none());
    }

    #[test]
    fn undo_switches_to_the_entry_page() {
        let mut alloc = IdAllocator::new();
        let mut pages = PageStore::new();
        let mut surface = Surface::new();
        let mut history = HistoryLedger::new();

        // Draw on page 0, then move to a fresh page 1.
        let object = stroke(&mut alloc, 0.0);
        history.record_add(0, std::slice::from_ref(&object));
        surface.insert_object(object);
        pages.next_or_new_page(&mut surface);
        assert_eq!(pages.current_index(), 1);

        assert!(history.undo(&mut pages, &mut surface));
        assert_eq!(pages.current_index(), 0);
        assert!(surface.is_empty());
    }

    #[test]
    fn modify_without_memento_is_skipped() {
        let mut alloc = IdAllocator::new();
        let mut history = HistoryLedger::new();
        let object = stroke(&mut alloc, 0.0);

        history.record_modify(0, std::slice::from_ref(&object));
        assert!(!history.can_undo());
    }
}
