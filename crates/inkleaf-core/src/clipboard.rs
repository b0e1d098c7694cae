//! Clipboard capture and paste materialization.

use crate::ids::{IdAllocator, ObjectId};
use crate::objects::{ImageFormat, PageObject};
use crate::surface::Surface;
use kurbo::{Point, Rect};

/// Internal clipboard slot holding deep clones of a captured selection.
#[derive(Debug, Clone, Default)]
pub struct ClipboardBridge {
    slot: Option<Vec<PageObject>>,
}

impl ClipboardBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    /// Capture a deep clone of the current selection into the slot.
    ///
    /// Returns the identities of the captured objects; empty means there was
    /// nothing to copy and the slot is left untouched.
    pub fn copy(&mut self, surface: &Surface) -> Vec<ObjectId> {
        let selected = surface.selection().to_vec();
        if selected.is_empty() {
            return Vec::new();
        }
        let clones = surface.clone_objects(&selected);
        if clones.is_empty() {
            return Vec::new();
        }
        let ids = clones.iter().map(PageObject::id).collect();
        self.slot = Some(clones);
        ids
    }

    /// Clone the slot contents with fresh identities, centered on `target`.
    ///
    /// A paste must never collide with an existing identity, including those
    /// of the originally copied objects: every paste is independently
    /// undoable and deletable.
    pub fn materialize(&self, ids: &mut IdAllocator, target: Point) -> Vec<PageObject> {
        let Some(slot) = &self.slot else {
            return Vec::new();
        };
        let mut clones = slot.clone();
        for object in &mut clones {
            object.reassign_ids(ids);
        }
        if let Some(bounds) = combined_bounds(&clones) {
            let delta = target - bounds.center();
            for object in &mut clones {
                object.translate(delta);
            }
        }
        clones
    }
}

fn combined_bounds(objects: &[PageObject]) -> Option<Rect> {
    let mut iter = objects.iter();
    let first = iter.next()?.bounds();
    Some(iter.fold(first, |acc, o| acc.union(o.bounds())))
}

/// A file delivered by a system paste or drop gesture.
#[derive(Debug, Clone)]
pub struct DroppedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl DroppedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn extension(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(_, ext)| ext)
    }
}

/// How a dropped file will be ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image(ImageFormat),
    Document,
    Unsupported,
}

/// Classify a dropped file: image magic bytes win, then the extension.
pub fn classify(file: &DroppedFile) -> FileKind {
    if let Some(format) = ImageFormat::from_magic_bytes(&file.bytes)
        .or_else(|| file.extension().and_then(ImageFormat::from_extension))
    {
        return FileKind::Image(format);
    }
    match file.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("ilf") || ext.eq_ignore_ascii_case("json") => {
            FileKind::Document
        }
        _ => FileKind::Unsupported,
    }
}

/// Outcome of ingesting one external paste/drop batch.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Objects created from image files.
    pub images_added: usize,
    /// Whether a dropped document replaced the open one.
    pub document_imported: bool,
    /// Whether same-application clipboard content was pasted afterwards.
    pub pasted_clipboard: bool,
    /// Per-file failures; the batch continues past them.
    pub failures: Vec<String>,
}
