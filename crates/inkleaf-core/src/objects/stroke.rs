//! Freehand pen stroke.

use super::ObjectStyle;
use crate::ids::ObjectId;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A freehand stroke made of connected points in page coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    #[serde(default)]
    pub id: ObjectId,
    pub points: Vec<Point>,
    pub style: ObjectStyle,
}

impl Stroke {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            id: ObjectId::UNASSIGNED,
            points,
            style: ObjectStyle::default(),
        }
    }

    /// Bounding box, inflated by half the stroke width.
    pub fn bounds(&self) -> Rect {
        let mut iter = self.points.iter();
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        let mut rect = Rect::from_points(*first, *first);
        for point in iter {
            rect = rect.union_pt(*point);
        }
        let half = self.style.stroke_width / 2.0;
        rect.inflate(half, half)
    }

    pub fn translate(&mut self, delta: Vec2) {
        for point in &mut self.points {
            *point += delta;
        }
    }
}
