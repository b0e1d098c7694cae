//! Stable object identity and the session-scoped allocator.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::objects::PageObject;

/// Unique identifier for a graphical object within a document's lifetime.
///
/// Assigned once and retained across serialize/deserialize round trips.
/// Zero is the unassigned sentinel, used for objects read from legacy files
/// that predate identity tracking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl ObjectId {
    /// Sentinel for objects that have not been assigned an identity yet.
    pub const UNASSIGNED: ObjectId = ObjectId(0);

    /// Whether an allocator has assigned this id.
    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues monotonically increasing object identities for one document session.
///
/// Identities are never reused after deletion; the counter only moves forward.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Return a fresh identity, strictly greater than every identity returned
    /// so far in this session.
    pub fn next_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next);
        self.next += 1;
        id
    }

    /// Assign an identity to `object` if it carries none; idempotent
    /// otherwise. Recurses into collection children so every nested object
    /// ends up tagged.
    pub fn ensure_id(&mut self, object: &mut PageObject) -> ObjectId {
        if !object.id().is_assigned() {
            object.set_id(self.next_id());
        }
        if let PageObject::Collection(collection) = object {
            for child in collection.children_mut() {
                self.ensure_id(child);
            }
        }
        object.id()
    }

    /// Advance the counter past `id`.
    ///
    /// Called after loading a document so the allocator never re-issues an
    /// identity already present in the loaded content.
    pub fn reserve_through(&mut self, id: ObjectId) {
        if id.0 >= self.next {
            self.next = id.0 + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Collection, PageObject, Stroke};
    use kurbo::Point;

    fn stroke() -> PageObject {
        PageObject::Stroke(Stroke::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]))
    }

    #[test]
    fn next_id_is_strictly_increasing() {
        let mut alloc = IdAllocator::new();
        let a = alloc.next_id();
        let b = alloc.next_id();
        let c = alloc.next_id();
        assert!(a < b && b < c);
        assert!(a.is_assigned());
    }

    #[test]
    fn ensure_id_is_idempotent() {
        let mut alloc = IdAllocator::new();
        let mut object = stroke();
        let first = alloc.ensure_id(&mut object);
        let second = alloc.ensure_id(&mut object);
        assert_eq!(first, second);
    }

    #[test]
    fn ensure_id_tags_collection_children() {
        let mut alloc = IdAllocator::new();
        let mut object =
            PageObject::Collection(Collection::new(vec![stroke(), stroke()]));
        alloc.ensure_id(&mut object);

        let PageObject::Collection(collection) = &object else {
            unreachable!()
        };
        let mut seen = vec![object.id()];
        for child in collection.children() {
            assert!(child.id().is_assigned());
            assert!(!seen.contains(&child.id()));
            seen.push(child.id());
        }
    }

    #[test]
    fn reserve_through_skips_loaded_ids() {
        let mut alloc = IdAllocator::new();
        alloc.reserve_through(ObjectId(41));
        assert_eq!(alloc.next_id(), ObjectId(42));

        // Reserving below the counter must not move it backwards.
        alloc.reserve_through(ObjectId(5));
        assert_eq!(alloc.next_id(), ObjectId(43));
    }
}
