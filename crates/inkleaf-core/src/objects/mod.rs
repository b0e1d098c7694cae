//! Graphical object definitions for the drawing surface.

mod collection;
mod image;
mod stroke;
mod text;

pub use collection::Collection;
pub use image::{Image, ImageFormat};
#[cfg(test)]
pub(crate) use image::png_header;
pub use stroke::Stroke;
pub use text::TextBox;

use crate::ids::{IdAllocator, ObjectId};
use kurbo::{Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub fn white() -> Self {
        Self::rgb(255, 255, 255)
    }
}

/// Style properties shared by drawable objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectStyle {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in page units.
    pub stroke_width: f64,
    /// Fill color (None = no fill).
    #[serde(default)]
    pub fill: Option<Color>,
}

impl Default for ObjectStyle {
    fn default() -> Self {
        Self {
            color: Color::black(),
            stroke_width: 2.0,
            fill: None,
        }
    }
}

/// A graphical object on a page.
///
/// `Collection` is a variant, not a subtype hierarchy: it stands in for
/// multiple child objects sharing a single selection, and expands to its
/// children whenever a page is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PageObject {
    Stroke(Stroke),
    Text(TextBox),
    Image(Image),
    Collection(Collection),
}

impl PageObject {
    pub fn id(&self) -> ObjectId {
        match self {
            PageObject::Stroke(o) => o.id,
            PageObject::Text(o) => o.id,
            PageObject::Image(o) => o.id,
            PageObject::Collection(o) => o.id,
        }
    }

    pub fn set_id(&mut self, id: ObjectId) {
        match self {
            PageObject::Stroke(o) => o.id = id,
            PageObject::Text(o) => o.id = id,
            PageObject::Image(o) => o.id = id,
            PageObject::Collection(o) => o.id = id,
        }
    }

    /// Bounding box in page coordinates.
    pub fn bounds(&self) -> Rect {
        match self {
            PageObject::Stroke(o) => o.bounds(),
            PageObject::Text(o) => o.bounds(),
            PageObject::Image(o) => o.bounds(),
            PageObject::Collection(o) => o.bounds(),
        }
    }

    /// Move the object by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        match self {
            PageObject::Stroke(o) => o.translate(delta),
            PageObject::Text(o) => o.translate(delta),
            PageObject::Image(o) => o.translate(delta),
            PageObject::Collection(o) => o.translate(delta),
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, PageObject::Collection(_))
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            PageObject::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// Append this object to `out`, expanding collections to their children.
    pub fn flatten_into(&self, out: &mut Vec<PageObject>) {
        match self {
            PageObject::Collection(collection) => {
                for child in collection.children() {
                    child.flatten_into(out);
                }
            }
            other => out.push(other.clone()),
        }
    }

    /// The object expanded to leaf objects (a single clone for non-collections).
    pub fn flattened(&self) -> Vec<PageObject> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    /// Give this object, and any collection children, fresh identities.
    ///
    /// Used when duplicating or pasting so clones never collide with existing
    /// identities.
    pub fn reassign_ids(&mut self, ids: &mut IdAllocator) {
        self.set_id(ids.next_id());
        if let PageObject::Collection(collection) = self {
            for child in collection.children_mut() {
                child.reassign_ids(ids);
            }
        }
    }

    /// Largest assigned identity in this object, descending into collections.
    pub fn max_id(&self) -> ObjectId {
        let mut max = self.id();
        if let PageObject::Collection(collection) = self {
            for child in collection.children() {
                max = max.max(child.max_id());
            }
        }
        max
    }
}
