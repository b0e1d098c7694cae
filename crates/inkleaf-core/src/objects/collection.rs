//! Collection object standing in for multiple children.

use super::PageObject;
use crate::ids::ObjectId;
use kurbo::{Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A group of objects manipulated as a single unit.
///
/// Collections carry an ordered sequence of child snapshots and may nest.
/// The page owns collections the same way it owns any other object; a
/// collection never points back at the surface holding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub(crate) id: ObjectId,
    children: Vec<PageObject>,
}

impl Collection {
    pub fn new(children: Vec<PageObject>) -> Self {
        Self {
            id: ObjectId::UNASSIGNED,
            children,
        }
    }

    pub fn children(&self) -> &[PageObject] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<PageObject> {
        &mut self.children
    }

    /// Dissolve the collection and return its children.
    pub fn into_children(self) -> Vec<PageObject> {
        self.children
    }

    pub fn bounds(&self) -> Rect {
        let mut iter = self.children.iter();
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        iter.fold(first.bounds(), |acc, child| acc.union(child.bounds()))
    }

    pub fn translate(&mut self, delta: Vec2) {
        for child in &mut self.children {
            child.translate(delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Stroke;
    use kurbo::Point;

    fn stroke(x: f64, y: f64) -> PageObject {
        PageObject::Stroke(Stroke::new(vec![
            Point::new(x, y),
            Point::new(x + 10.0, y + 10.0),
        ]))
    }

    #[test]
    fn bounds_unions_children() {
        let collection = Collection::new(vec![stroke(0.0, 0.0), stroke(100.0, 100.0)]);
        let bounds = collection.bounds();
        assert!(bounds.x1 >= 110.0 && bounds.y1 >= 110.0);
    }

    #[test]
    fn translate_moves_every_child() {
        let mut collection = Collection::new(vec![stroke(0.0, 0.0), stroke(50.0, 50.0)]);
        let before = collection.bounds();
        collection.translate(Vec2::new(10.0, 0.0));
        let after = collection.bounds();
        assert!((after.x0 - before.x0 - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn into_children_dissolves_the_collection() {
        let collection = Collection::new(vec![stroke(0.0, 0.0), stroke(50.0, 50.0)]);
        assert_eq!(collection.into_children().len(), 2);
    }
}
