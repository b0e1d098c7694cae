//! Text block object.

use super::ObjectStyle;
use crate::ids::ObjectId;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A positioned block of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    #[serde(default)]
    pub id: ObjectId,
    /// Top-left corner position.
    pub position: Point,
    pub content: String,
    pub font_size: f64,
    pub style: ObjectStyle,
}

impl TextBox {
    pub fn new(position: Point, content: impl Into<String>) -> Self {
        Self {
            id: ObjectId::UNASSIGNED,
            position,
            content: content.into(),
            font_size: 16.0,
            style: ObjectStyle::default(),
        }
    }

    /// Rough bounding box from character counts; precise layout is the
    /// renderer's concern.
    pub fn bounds(&self) -> Rect {
        let widest = self
            .content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let lines = self.content.lines().count().max(1);
        let width = widest as f64 * self.font_size * 0.6;
        let height = lines as f64 * self.font_size * 1.2;
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + width,
            self.position.y + height,
        )
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}
