//! The live page surface mirrored by the renderer.

use crate::ids::ObjectId;
use crate::objects::PageObject;
use crate::page::PageSnapshot;
use kurbo::Point;

/// In-memory model of exactly the currently active page.
///
/// The rendering collaborator mirrors this model. All document mutations flow
/// through it, and each one raises a re-render request the renderer drains
/// once per frame via [`Surface::take_render_request`].
#[derive(Debug, Clone)]
pub struct Surface {
    /// Objects in z-order (back to front).
    objects: Vec<PageObject>,
    /// Page background descriptor.
    pub background: String,
    pub width: f64,
    pub height: f64,
    /// Currently active selection, in activation order.
    selection: Vec<ObjectId>,
    needs_render: bool,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    /// A blank surface mirroring a default page.
    pub fn new() -> Self {
        let mut surface = Self {
            objects: Vec::new(),
            background: String::new(),
            width: 0.0,
            height: 0.0,
            selection: Vec::new(),
            needs_render: false,
        };
        surface.load_snapshot(&PageSnapshot::blank());
        surface
    }

    pub fn objects(&self) -> &[PageObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&PageObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Place an object on top of the z-order.
    pub fn insert_object(&mut self, object: PageObject) {
        self.objects.push(object);
        self.needs_render = true;
    }

    /// Remove every object matching `ids`, returning the removed objects in
    /// their z-order. The selection drops the removed identities.
    pub fn remove_by_id(&mut self, ids: &[ObjectId]) -> Vec<PageObject> {
        if ids.is_empty() {
            return Vec::new();
        }
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.objects.len());
        for object in self.objects.drain(..) {
            if ids.contains(&object.id()) {
                removed.push(object);
            } else {
                kept.push(object);
            }
        }
        self.objects = kept;
        if !removed.is_empty() {
            self.selection.retain(|id| !ids.contains(id));
            self.needs_render = true;
        }
        removed
    }

    /// Clone the objects matching `ids`, in the order of `ids`.
    pub fn clone_objects(&self, ids: &[ObjectId]) -> Vec<PageObject> {
        ids.iter()
            .filter_map(|id| self.object(*id).cloned())
            .collect()
    }

    pub fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    pub fn set_selection(&mut self, ids: Vec<ObjectId>) {
        self.selection = ids;
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected_objects(&self) -> Vec<&PageObject> {
        self.selection
            .iter()
            .filter_map(|id| self.object(*id))
            .collect()
    }

    /// Serialize the surface into an inert snapshot.
    ///
    /// Collections are expanded to their children here; grouping is a live
    /// selection convenience, not a persisted structure.
    pub fn to_snapshot(&self) -> PageSnapshot {
        let mut objects = Vec::with_capacity(self.objects.len());
        for object in &self.objects {
            object.flatten_into(&mut objects);
        }
        PageSnapshot {
            objects,
            background: self.background.clone(),
            width: self.width,
            height: self.height,
            canvas_version: crate::page::CANVAS_VERSION,
        }
    }

    /// Replace the surface contents with `snapshot`. Clears the selection.
    pub fn load_snapshot(&mut self, snapshot: &PageSnapshot) {
        self.objects = snapshot.objects.clone();
        self.background = snapshot.background.clone();
        self.width = snapshot.width;
        self.height = snapshot.height;
        self.selection.clear();
        self.needs_render = true;
    }

    pub fn page_center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Ask the renderer to redraw this page.
    pub fn request_rerender(&mut self) {
        self.needs_render = true;
    }

    /// Drain the pending re-render request.
    pub fn take_render_request(&mut self) -> bool {
        std::mem::take(&mut self.needs_render)
    }
}
