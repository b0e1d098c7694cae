//! Page snapshots and the ordered page store.

use crate::objects::PageObject;
use crate::surface::Surface;
use serde::{Deserialize, Serialize};

/// Canvas format marker written into every page snapshot.
pub const CANVAS_VERSION: u32 = 2;

pub const DEFAULT_PAGE_WIDTH: f64 = 612.0;
pub const DEFAULT_PAGE_HEIGHT: f64 = 792.0;
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

/// A complete, inert description of one page's contents.
///
/// Safe to store or transmit. Every field is defaulted so snapshots written
/// by older versions (fields are only ever added) still read cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default)]
    pub objects: Vec<PageObject>,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_page_width")]
    pub width: f64,
    #[serde(default = "default_page_height")]
    pub height: f64,
    /// Canvas format marker the page was written with.
    #[serde(rename = "canvas-version", default = "default_canvas_version")]
    pub canvas_version: u32,
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

fn default_page_width() -> f64 {
    DEFAULT_PAGE_WIDTH
}

fn default_page_height() -> f64 {
    DEFAULT_PAGE_HEIGHT
}

fn default_canvas_version() -> u32 {
    CANVAS_VERSION
}

impl Default for PageSnapshot {
    fn default() -> Self {
        Self::blank()
    }
}

impl PageSnapshot {
    /// A fresh page with no objects.
    pub fn blank() -> Self {
        Self {
            objects: Vec::new(),
            background: default_background(),
            width: DEFAULT_PAGE_WIDTH,
            height: DEFAULT_PAGE_HEIGHT,
            canvas_version: CANVAS_VERSION,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Ordered sequence of page snapshots plus the index of the active page.
///
/// Exactly one page is live (mirrored by the [`Surface`]) at any time; all
/// other indices hold the last-flushed snapshot. A store always contains at
/// least one page.
#[derive(Debug, Clone)]
pub struct PageStore {
    pages: Vec<PageSnapshot>,
    current: usize,
    /// Whether the document has user-visible changes since the last save.
    modified: bool,
}

impl Default for PageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PageStore {
    pub fn new() -> Self {
        Self {
            pages: vec![PageSnapshot::blank()],
            current: 0,
            modified: false,
        }
    }

    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn page(&self, index: usize) -> &PageSnapshot {
        &self.pages[index]
    }

    pub fn pages(&self) -> &[PageSnapshot] {
        &self.pages
    }

    pub(crate) fn pages_mut(&mut self) -> &mut [PageSnapshot] {
        &mut self.pages
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_modified(&mut self) {
        self.modified = true;
    }

    pub fn clear_modified(&mut self) {
        self.modified = false;
    }

    /// Serialize the live surface into the active slot, overwriting the prior
    /// snapshot.
    pub fn save_page(&mut self, surface: &Surface) {
        self.pages[self.current] = surface.to_snapshot();
    }

    /// Switch the live surface to `index` and return it.
    ///
    /// When `flush_current` is set the live page is flushed first; a switch to
    /// the already-active index still flushes but skips the reload. An
    /// out-of-bounds index is a programmer error: all index arithmetic must
    /// derive from [`PageStore::total_pages`].
    pub fn load_page(&mut self, index: usize, surface: &mut Surface, flush_current: bool) -> usize {
        assert!(
            index < self.pages.len(),
            "page index {index} out of bounds ({} pages)",
            self.pages.len()
        );
        if flush_current {
            self.save_page(surface);
            if index == self.current {
                return self.current;
            }
        }
        surface.load_snapshot(&self.pages[index]);
        self.current = index;
        index
    }

    /// Go to the previous page, growing the document backward with a blank
    /// page when already at the first one. Returns the new active index.
    pub fn previous_or_new_page(&mut self, surface: &mut Surface) -> usize {
        if self.current == 0 {
            self.insert_pages_before(vec![PageSnapshot::blank()], surface, false);
            self.current
        } else {
            self.load_page(self.current - 1, surface, true)
        }
    }

    /// Go to the next page, growing the document forward with a blank page
    /// when already at the last one. Returns the new active index.
    pub fn next_or_new_page(&mut self, surface: &mut Surface) -> usize {
        if self.current + 1 == self.pages.len() {
            self.insert_pages_after(vec![PageSnapshot::blank()], surface, false);
            self.current
        } else {
            self.load_page(self.current + 1, surface, true)
        }
    }

    /// Splice pages in just before the active page and reload at the original
    /// index, which now addresses the first inserted page.
    ///
    /// `mark_modified` distinguishes user-visible content changes from
    /// internally generated blank pages, which must not trigger
    /// unsaved-changes prompts.
    pub fn insert_pages_before(
        &mut self,
        pages: Vec<PageSnapshot>,
        surface: &mut Surface,
        mark_modified: bool,
    ) {
        if pages.is_empty() {
            return;
        }
        self.save_page(surface);
        let at = self.current;
        self.pages.splice(at..at, pages);
        if mark_modified {
            self.modified = true;
        }
        self.load_page(at, surface, false);
    }

    /// Splice pages in just after the active page and reload on the first
    /// inserted one.
    pub fn insert_pages_after(
        &mut self,
        pages: Vec<PageSnapshot>,
        surface: &mut Surface,
        mark_modified: bool,
    ) {
        if pages.is_empty() {
            return;
        }
        self.save_page(surface);
        let at = self.current + 1;
        self.pages.splice(at..at, pages);
        if mark_modified {
            self.modified = true;
        }
        self.load_page(at, surface, false);
    }

    /// Wholesale replace the document.
    ///
    /// `confirm` is consulted only when the existing document has unsaved,
    /// non-empty content. Returns whether the overwrite was applied; when
    /// declined the store is left unchanged.
    pub fn overwrite_pages(
        &mut self,
        pages: Vec<PageSnapshot>,
        surface: &mut Surface,
        confirm: impl FnOnce() -> bool,
    ) -> bool {
        let has_content = self.pages.iter().any(|p| !p.is_blank());
        if self.modified && has_content && !confirm() {
            log::info!("document overwrite declined");
            return false;
        }
        self.pages = if pages.is_empty() {
            vec![PageSnapshot::blank()]
        } else {
            pages
        };
        self.current = 0;
        self.modified = false;
        surface.load_snapshot(&self.pages[0]);
        true
    }

    /// Whether any page holds objects.
    pub fn has_content(&self) -> bool {
        self.pages.iter().any(|p| !p.is_blank())
    }

    /// Every object across every flushed page, in page order.
    pub fn all_objects(&self) -> impl Iterator<Item = &PageObject> {
        self.pages.iter().flat_map(|p| p.objects.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Stroke;
    use kurbo::Point;

    fn surface_with_stroke() -> Surface {
        let mut surface = Surface::new();
        let mut stroke = Stroke::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        stroke.id = crate::ids::ObjectId(1);
        surface.insert_object(PageObject::Stroke(stroke));
        surface
    }

    #[test]
    fn new_store_has_one_blank_page() {
        let store = PageStore::new();
        assert_eq!(store.total_pages(), 1);
        assert_eq!(store.current_index(), 0);
        assert!(store.page(0).is_blank());
    }

    #[test]
    fn noop_switch_still_flushes() {
        let mut store = PageStore::new();
        let mut surface = surface_with_stroke();

        store.load_page(0, &mut surface, true);
        assert_eq!(store.page(0).objects.len(), 1);
        // The live surface was not reloaded, so its contents survive.
        assert_eq!(surface.len(), 1);
    }

    #[test]
    fn grow_backward_then_forward() {
        let mut store = PageStore::new();
        let mut surface = Surface::new();

        // On page 0 of 1: previous inserts a blank page before it.
        store.previous_or_new_page(&mut surface);
        assert_eq!(store.total_pages(), 2);
        assert_eq!(store.current_index(), 0);

        store.next_or_new_page(&mut surface);
        store.next_or_new_page(&mut surface);
        assert_eq!(store.total_pages(), 3);
        assert_eq!(store.current_index(), 2);
    }

    #[test]
    fn page_count_never_drops_below_one() {
        let mut store = PageStore::new();
        let mut surface = Surface::new();
        for _ in 0..3 {
            store.previous_or_new_page(&mut surface);
        }
        assert!(store.total_pages() >= 1);
        assert_eq!(store.current_index(), 0);
    }

    #[test]
    fn blank_insertion_does_not_mark_modified() {
        let mut store = PageStore::new();
        let mut surface = Surface::new();

        store.insert_pages_after(vec![PageSnapshot::blank()], &mut surface, false);
        assert!(!store.is_modified());

        store.insert_pages_after(vec![PageSnapshot::blank()], &mut surface, true);
        assert!(store.is_modified());
    }

    #[test]
    fn insert_after_lands_on_first_inserted_page() {
        let mut store = PageStore::new();
        let mut surface = Surface::new();

        store.insert_pages_after(
            vec![PageSnapshot::blank(), PageSnapshot::blank()],
            &mut surface,
            false,
        );
        assert_eq!(store.total_pages(), 3);
        assert_eq!(store.current_index(), 1);
    }

    #[test]
    fn overwrite_unmodified_blank_document_skips_confirmation() {
        let mut store = PageStore::new();
        let mut surface = Surface::new();
        let replacement = vec![PageSnapshot::blank(), PageSnapshot::blank()];

        let applied = store.overwrite_pages(replacement.clone(), &mut surface, || {
            panic!("confirmation requested for a blank, unmodified document")
        });
        assert!(applied);
        assert_eq!(store.pages(), replacement.as_slice());
        assert_eq!(store.current_index(), 0);
    }

    #[test]
    fn declined_overwrite_leaves_store_unchanged() {
        let mut store = PageStore::new();
        let mut surface = surface_with_stroke();
        store.save_page(&surface);
        store.mark_modified();
        let before = store.pages().to_vec();

        let applied = store.overwrite_pages(vec![PageSnapshot::blank()], &mut surface, || false);
        assert!(!applied);
        assert_eq!(store.pages(), before.as_slice());
        assert!(store.is_modified());
    }

    #[test]
    fn empty_replacement_normalizes_to_one_blank_page() {
        let mut store = PageStore::new();
        let mut surface = Surface::new();
        assert!(store.overwrite_pages(Vec::new(), &mut surface, || true));
        assert_eq!(store.total_pages(), 1);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn out_of_range_index_is_fatal() {
        let mut store = PageStore::new();
        let mut surface = Surface::new();
        store.load_page(5, &mut surface, true);
    }
}
