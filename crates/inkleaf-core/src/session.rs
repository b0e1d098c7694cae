//! Top-level document session wiring the engine components together.

use crate::clipboard::{ClipboardBridge, DroppedFile, FileKind, IngestReport, classify};
use crate::format::{self, FormatError, PageRenderer};
use crate::history::HistoryLedger;
use crate::ids::{IdAllocator, ObjectId};
use crate::objects::{Image, PageObject};
use crate::page::{PageSnapshot, PageStore};
use crate::surface::Surface;
use kurbo::{Point, Vec2};

/// Notifications emitted by the session, drained via
/// [`DocumentSession::poll_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The undo/redo stacks changed.
    HistoryChanged,
    /// A different page became active.
    PageChanged { index: usize },
    /// The whole document was replaced.
    DocumentReplaced,
    /// The active selection changed.
    SelectionChanged,
}

/// One open document.
///
/// Owns the live surface, page store, history ledger, identity allocator and
/// clipboard together, so every operation (drawing events, shortcuts,
/// clipboard, file I/O) observes a single consistent model of what the
/// document currently contains.
#[derive(Debug, Default)]
pub struct DocumentSession {
    surface: Surface,
    pages: PageStore,
    history: HistoryLedger,
    ids: IdAllocator,
    clipboard: ClipboardBridge,
    /// Last known pointer position on the live page.
    pointer: Option<Point>,
    events: Vec<SessionEvent>,
}

impl DocumentSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn pages(&self) -> &PageStore {
        &self.pages
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn current_page_index(&self) -> usize {
        self.pages.current_index()
    }

    pub fn total_pages(&self) -> usize {
        self.pages.total_pages()
    }

    pub fn is_modified(&self) -> bool {
        self.pages.is_modified()
    }

    /// Drain pending notifications.
    pub fn poll_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Track the pointer so pastes and drops land where the user is working.
    pub fn pointer_moved(&mut self, position: Point) {
        self.pointer = Some(position);
    }

    // ---- tool layer events -------------------------------------------------

    /// A tool finished creating `object`. Assigns an identity if the object
    /// carries none, records the edit and places the object on the live page.
    pub fn object_created(&mut self, mut object: PageObject) -> ObjectId {
        let id = self.ids.ensure_id(&mut object);
        self.history
            .record_add(self.pages.current_index(), std::slice::from_ref(&object));
        self.surface.insert_object(object);
        self.pages.mark_modified();
        self.events.push(SessionEvent::HistoryChanged);
        id
    }

    /// Objects were removed from the live page (delete key, eraser).
    ///
    /// The whole set becomes one history entry, with collections flattened to
    /// their children so undo restores every former constituent.
    pub fn objects_removed(&mut self, ids: &[ObjectId]) {
        let removed = self.surface.remove_by_id(ids);
        if removed.is_empty() {
            return;
        }
        let flattened: Vec<PageObject> = removed.iter().flat_map(|o| o.flattened()).collect();
        self.history
            .record_remove(self.pages.current_index(), &flattened);
        self.pages.mark_modified();
        self.events.push(SessionEvent::HistoryChanged);
    }

    /// A selection became active. Captures its state so a later modification
    /// can be recorded with a before-state.
    pub fn selection_activated(&mut self, ids: &[ObjectId]) {
        self.surface.set_selection(ids.to_vec());
        self.history
            .capture_selection(self.surface.clone_objects(ids));
        self.events.push(SessionEvent::SelectionChanged);
    }

    /// The active selection was modified in place (moved, resized, restyled).
    pub fn objects_modified(&mut self, ids: &[ObjectId]) {
        let after = self.surface.clone_objects(ids);
        self.history
            .record_modify(self.pages.current_index(), &after);
        self.pages.mark_modified();
        self.events.push(SessionEvent::HistoryChanged);
    }

    // ---- undo/redo ---------------------------------------------------------

    /// Revert the most recent edit. Benign no-op when nothing can be undone.
    pub fn undo(&mut self) -> bool {
        let previous_page = self.pages.current_index();
        if !self.history.undo(&mut self.pages, &mut self.surface) {
            return false;
        }
        self.after_replay(previous_page);
        true
    }

    /// Re-apply the most recently undone edit. Benign no-op when nothing can
    /// be redone.
    pub fn redo(&mut self) -> bool {
        let previous_page = self.pages.current_index();
        if !self.history.redo(&mut self.pages, &mut self.surface) {
            return false;
        }
        self.after_replay(previous_page);
        true
    }

    fn after_replay(&mut self, previous_page: usize) {
        self.pages.mark_modified();
        self.events.push(SessionEvent::HistoryChanged);
        self.events.push(SessionEvent::SelectionChanged);
        let index = self.pages.current_index();
        if index != previous_page {
            self.events.push(SessionEvent::PageChanged { index });
        }
    }

    // ---- page navigation ---------------------------------------------------

    /// Flush the live page into its snapshot slot.
    pub fn save_page(&mut self) {
        self.pages.save_page(&self.surface);
    }

    /// Switch to `index`, flushing the live page first.
    pub fn load_page(&mut self, index: usize) -> usize {
        let previous = self.pages.current_index();
        let loaded = self.pages.load_page(index, &mut self.surface, true);
        if loaded != previous {
            self.events.push(SessionEvent::PageChanged { index: loaded });
        }
        loaded
    }

    pub fn previous_or_new_page(&mut self) -> usize {
        let index = self.pages.previous_or_new_page(&mut self.surface);
        self.events.push(SessionEvent::PageChanged { index });
        index
    }

    pub fn next_or_new_page(&mut self) -> usize {
        let index = self.pages.next_or_new_page(&mut self.surface);
        self.events.push(SessionEvent::PageChanged { index });
        index
    }

    pub fn insert_pages_before(&mut self, pages: Vec<PageSnapshot>, mark_modified: bool) {
        self.pages
            .insert_pages_before(pages, &mut self.surface, mark_modified);
        self.events.push(SessionEvent::PageChanged {
            index: self.pages.current_index(),
        });
    }

    pub fn insert_pages_after(&mut self, pages: Vec<PageSnapshot>, mark_modified: bool) {
        self.pages
            .insert_pages_after(pages, &mut self.surface, mark_modified);
        self.events.push(SessionEvent::PageChanged {
            index: self.pages.current_index(),
        });
    }

    /// Wholesale replace the document with externally supplied pages.
    ///
    /// Recorded history refers to page indices of the replaced document, so a
    /// successful overwrite clears the ledger and adopts the identities found
    /// in the new content.
    pub fn overwrite_pages(
        &mut self,
        pages: Vec<PageSnapshot>,
        confirm: impl FnOnce() -> bool,
    ) -> bool {
        if !self
            .pages
            .overwrite_pages(pages, &mut self.surface, confirm)
        {
            return false;
        }
        self.adopt_loaded_identities();
        self.history.clear();
        self.events.push(SessionEvent::DocumentReplaced);
        true
    }

    /// Reserve every identity present in loaded content, then assign fresh
    /// ones to legacy objects that carry none, and reload the live surface so
    /// it sees the assignments.
    fn adopt_loaded_identities(&mut self) {
        let mut max = ObjectId::UNASSIGNED;
        for object in self.pages.all_objects() {
            max = max.max(object.max_id());
        }
        self.ids.reserve_through(max);
        for page in self.pages.pages_mut() {
            for object in &mut page.objects {
                self.ids.ensure_id(object);
            }
        }
        let current = self.pages.current_index();
        self.pages.load_page(current, &mut self.surface, false);
    }

    // ---- clipboard ---------------------------------------------------------

    /// Capture the current selection into the clipboard slot.
    pub fn copy(&mut self) -> bool {
        !self.clipboard.copy(&self.surface).is_empty()
    }

    /// Copy, then remove the selection from the page as one reversible edit.
    pub fn cut(&mut self) -> bool {
        let ids = self.clipboard.copy(&self.surface);
        if ids.is_empty() {
            return false;
        }
        self.surface.clear_selection();
        self.objects_removed(&ids);
        self.events.push(SessionEvent::SelectionChanged);
        true
    }

    /// Materialize the clipboard at the pointer (or page center), select the
    /// clones and record a single add entry. No-op when the slot is empty.
    pub fn paste(&mut self) -> bool {
        let target = self.paste_target();
        let clones = self.clipboard.materialize(&mut self.ids, target);
        if clones.is_empty() {
            return false;
        }
        let ids: Vec<ObjectId> = clones.iter().map(PageObject::id).collect();
        self.history.record_add(self.pages.current_index(), &clones);
        for object in clones {
            self.surface.insert_object(object);
        }
        self.pages.mark_modified();
        self.events.push(SessionEvent::HistoryChanged);
        self.selection_activated(&ids);
        true
    }

    /// Ingest files delivered by a system paste or drop gesture.
    ///
    /// Image files are placed at the pointer position and coalesced into a
    /// single add entry; document files replace the open document (subject to
    /// `confirm`). A failing file is logged and reported without aborting the
    /// rest of the batch. Finishes by pasting any same-application clipboard
    /// content captured alongside.
    pub fn paste_external(
        &mut self,
        files: &[DroppedFile],
        mut confirm: impl FnMut() -> bool,
    ) -> IngestReport {
        let mut report = IngestReport::default();
        let mut images: Vec<Image> = Vec::new();
        let target = self.paste_target();

        for file in files {
            match classify(file) {
                FileKind::Image(format) => {
                    let mut image = Image::from_bytes(Point::ZERO, &file.bytes, format);
                    image.position = target - Vec2::new(image.width / 2.0, image.height / 2.0);
                    images.push(image);
                }
                FileKind::Document => match std::str::from_utf8(&file.bytes) {
                    Ok(text) => match format::read(text) {
                        Ok(pages) => {
                            if self.overwrite_pages(pages, &mut confirm) {
                                report.document_imported = true;
                            }
                        }
                        Err(err) => {
                            log::warn!("dropped document {} rejected: {err}", file.name);
                            report.failures.push(format!("{}: {err}", file.name));
                        }
                    },
                    Err(_) => {
                        report
                            .failures
                            .push(format!("{}: not valid UTF-8", file.name));
                    }
                },
                FileKind::Unsupported => {
                    log::debug!("ignoring unsupported dropped file {}", file.name);
                    report
                        .failures
                        .push(format!("{}: unsupported file type", file.name));
                }
            }
        }

        if !images.is_empty() {
            let mut objects = Vec::with_capacity(images.len());
            for image in images {
                let mut object = PageObject::Image(image);
                self.ids.ensure_id(&mut object);
                objects.push(object);
            }
            report.images_added = objects.len();
            self.history.record_add(self.pages.current_index(), &objects);
            for object in objects {
                self.surface.insert_object(object);
            }
            self.pages.mark_modified();
            self.events.push(SessionEvent::HistoryChanged);
        }

        if !self.clipboard.is_empty() {
            report.pasted_clipboard = self.paste();
        }

        report
    }

    fn paste_target(&self) -> Point {
        self.pointer.unwrap_or_else(|| self.surface.page_center())
    }

    // ---- file I/O ----------------------------------------------------------

    /// Open interchange text, replacing the current document.
    ///
    /// Malformed input never partially applies: the store is untouched unless
    /// parsing succeeded and the overwrite was confirmed.
    pub fn open(&mut self, raw: &str, confirm: impl FnOnce() -> bool) -> Result<bool, FormatError> {
        let pages = format::read(raw)?;
        Ok(self.overwrite_pages(pages, confirm))
    }

    /// Serialize the whole document, flushing the live page first. A saved
    /// document is no longer considered modified.
    pub fn save(&mut self) -> Result<String, FormatError> {
        self.pages.save_page(&self.surface);
        let raw = format::write(self.pages.pages())?;
        self.pages.clear_modified();
        Ok(raw)
    }

    /// Run `renderer` over every page, restoring the active one afterwards.
    pub fn export<R: PageRenderer>(&mut self, renderer: &mut R) -> Result<(), R::Error> {
        format::export_document(&mut self.pages, &mut self.surface, renderer)
    }
}
