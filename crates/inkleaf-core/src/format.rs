//! Versioned document interchange format.

use crate::page::{PageSnapshot, PageStore};
use crate::surface::Surface;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Format version stamped on every written document.
///
/// Writing always happens at the current version; reading accepts any past
/// version, because fields are only ever added and every reader-visible field
/// is defaulted.
pub const FORMAT_VERSION: u32 = 2;

/// Errors raised while reading or writing interchange documents.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The top-level `format-version` marker is absent.
    #[error("malformed document: missing format-version marker")]
    MissingVersion,
    #[error("malformed document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// On-disk/interchange form of a whole document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFile {
    #[serde(rename = "format-version")]
    pub format_version: u32,
    #[serde(default)]
    pub pages: Vec<PageSnapshot>,
}

/// Parse interchange text into a page sequence.
///
/// The structural check only requires the `format-version` key to be present,
/// not any particular value. Failure never partially applies; callers decide
/// what to do with the parsed pages.
pub fn read(raw: &str) -> Result<Vec<PageSnapshot>, FormatError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if value.get("format-version").is_none() {
        return Err(FormatError::MissingVersion);
    }
    let file: DocumentFile = serde_json::from_value(value)?;
    Ok(file.pages)
}

/// Serialize a page sequence, stamped with the current format version.
pub fn write(pages: &[PageSnapshot]) -> Result<String, FormatError> {
    let file = DocumentFile {
        format_version: FORMAT_VERSION,
        pages: pages.to_vec(),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Capability to capture one page during a multi-page export.
pub trait PageRenderer {
    type Error;

    /// Capture the page currently mirrored by `surface`.
    fn render_page(&mut self, index: usize, surface: &Surface) -> Result<(), Self::Error>;
}

/// Walk every page through the live surface in index order.
///
/// Each page is flushed/reloaded onto the surface and handed to the renderer;
/// the originally active page is restored afterwards, error or not. The
/// traversal never changes the store's content.
pub fn export_document<R: PageRenderer>(
    pages: &mut PageStore,
    surface: &mut Surface,
    renderer: &mut R,
) -> Result<(), R::Error> {
    let original = pages.current_index();
    let mut result = Ok(());
    for index in 0..pages.total_pages() {
        pages.load_page(index, surface, true);
        if let Err(err) = renderer.render_page(index, surface) {
            result = Err(err);
            break;
        }
    }
    pages.load_page(original, surface, true);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{PageObject, Stroke};
    use kurbo::Point;

    fn page_with_stroke(x: f64) -> PageSnapshot {
        let mut stroke = Stroke::new(vec![Point::new(x, 0.0), Point::new(x + 5.0, 5.0)]);
        stroke.id = crate::ids::ObjectId(1);
        PageSnapshot {
            objects: vec![PageObject::Stroke(stroke)],
            ..PageSnapshot::blank()
        }
    }

    #[test]
    fn write_then_read_round_trips() {
        let pages = vec![page_with_stroke(0.0), PageSnapshot::blank()];
        let raw = write(&pages).unwrap();
        let parsed = read(&raw).unwrap();
        assert_eq!(parsed, pages);
    }

    #[test]
    fn missing_version_marker_is_malformed() {
        let raw = r#"{"pages": []}"#;
        assert!(matches!(read(raw), Err(FormatError::MissingVersion)));
    }

    #[test]
    fn version_marker_value_is_not_checked() {
        let raw = r#"{"format-version": 1, "pages": []}"#;
        assert!(read(raw).unwrap().is_empty());
    }

    #[test]
    fn older_documents_with_missing_fields_still_read() {
        // A version-1 page knew nothing of size or canvas markers.
        let raw = r##"{
            "format-version": 1,
            "pages": [{"objects": [], "background": "#f0f0f0"}]
        }"##;
        let pages = read(raw).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].background, "#f0f0f0");
        assert!(pages[0].width > 0.0);
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(read("not json"), Err(FormatError::Parse(_))));
    }

    struct CountingRenderer {
        seen: Vec<(usize, usize)>,
        fail_at: Option<usize>,
    }

    impl PageRenderer for CountingRenderer {
        type Error = String;

        fn render_page(&mut self, index: usize, surface: &Surface) -> Result<(), String> {
            if self.fail_at == Some(index) {
                return Err(format!("render failed on page {index}"));
            }
            self.seen.push((index, surface.len()));
            Ok(())
        }
    }

    #[test]
    fn export_visits_every_page_and_restores_the_active_one() {
        let mut pages = PageStore::new();
        let mut surface = Surface::new();
        pages.overwrite_pages(
            vec![page_with_stroke(0.0), PageSnapshot::blank(), page_with_stroke(9.0)],
            &mut surface,
            || true,
        );
        pages.load_page(1, &mut surface, true);
        let content_before = pages.pages().to_vec();

        let mut renderer = CountingRenderer {
            seen: Vec::new(),
            fail_at: None,
        };
        export_document(&mut pages, &mut surface, &mut renderer).unwrap();

        assert_eq!(renderer.seen, vec![(0, 1), (1, 0), (2, 1)]);
        assert_eq!(pages.current_index(), 1);
        assert_eq!(pages.pages(), content_before.as_slice());
    }

    #[test]
    fn export_restores_active_page_after_a_failure() {
        let mut pages = PageStore::new();
        let mut surface = Surface::new();
        pages.overwrite_pages(
            vec![page_with_stroke(0.0), PageSnapshot::blank()],
            &mut surface,
            || true,
        );

        let mut renderer = CountingRenderer {
            seen: Vec::new(),
            fail_at: Some(1),
        };
        let result = export_document(&mut pages, &mut surface, &mut renderer);
        assert!(result.is_err());
        assert_eq!(pages.current_index(), 0);
    }
}
