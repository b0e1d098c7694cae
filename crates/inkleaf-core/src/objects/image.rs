//! Embedded raster image object.

use crate::ids::ObjectId;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Display size used when the intrinsic pixel size cannot be probed.
pub const DEFAULT_IMAGE_WIDTH: f64 = 400.0;
pub const DEFAULT_IMAGE_HEIGHT: f64 = 300.0;

/// Image format for stored image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        None
    }

    /// Probe the intrinsic pixel size without a full decode.
    ///
    /// Only PNG is cheap enough to probe here (the IHDR chunk sits at a fixed
    /// offset); decoding anything else is the renderer's job.
    pub fn probe_dimensions(data: &[u8]) -> Option<(u32, u32)> {
        if Self::from_magic_bytes(data) != Some(ImageFormat::Png) || data.len() < 24 {
            return None;
        }
        let width = u32::from_be_bytes(data[16..20].try_into().ok()?);
        let height = u32::from_be_bytes(data[20..24].try_into().ok()?);
        if width == 0 || height == 0 {
            None
        } else {
            Some((width, height))
        }
    }
}

/// A raster image embedded in the page.
///
/// Image data is kept as a base64 string so snapshots stay plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub id: ObjectId,
    /// Top-left corner position.
    pub position: Point,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
    pub format: ImageFormat,
    pub data_base64: String,
}

impl Image {
    /// Create an image object from raw file bytes.
    ///
    /// The display size follows the intrinsic pixel size when it can be
    /// probed, and falls back to a fixed default otherwise.
    pub fn from_bytes(position: Point, data: &[u8], format: ImageFormat) -> Self {
        use base64::{Engine, engine::general_purpose::STANDARD};

        let (width, height) = match ImageFormat::probe_dimensions(data) {
            Some((w, h)) => (w as f64, h as f64),
            None => (DEFAULT_IMAGE_WIDTH, DEFAULT_IMAGE_HEIGHT),
        };
        Self {
            id: ObjectId::UNASSIGNED,
            position,
            width,
            height,
            format,
            data_base64: STANDARD.encode(data),
        }
    }

    /// Override the display size.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Raw image bytes, decoded from base64.
    pub fn data(&self) -> Option<Vec<u8>> {
        use base64::{Engine, engine::general_purpose::STANDARD};
        STANDARD.decode(&self.data_base64).ok()
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}

/// PNG signature plus an IHDR chunk declaring the given pixel size.
#[cfg(test)]
pub(crate) fn png_header(width: u32, height: u32) -> Vec<u8> {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[8, 6, 0, 0, 0]);
    data
}
