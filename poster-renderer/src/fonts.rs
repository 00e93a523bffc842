//! Font discovery and text measurement.
//!
//! Families are resolved once against the system font database and cached.
//! The same resolved face backs both [`TextMeasurer`] and glyph painting, so
//! hit-test bounds always agree with the pixels the compositor puts down.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use fontdb::{Database, FaceInfo, Family, Query, Source, Stretch, Style, Weight};
use poster_core::TextMeasurer;
use rusttype::{point, Font, Scale};

use crate::error::{RenderError, RenderResult};

/// Catalog families that should fall back to a serif face. Everything else
/// falls back to sans-serif.
const SERIF_FAMILIES: [&str; 2] = ["Times New Roman", "Georgia"];

fn system_db() -> &'static Database {
    static DB: OnceLock<Database> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!("Loaded {} system font faces", db.len());
        db
    })
}

/// Resolves editor family names to loaded font faces.
///
/// Resolution tries the named family first, then the generic family it maps
/// to, then sans-serif, then any installed upright face, so the engine still
/// renders on hosts that lack the original faces. Resolved faces are cached
/// per family name.
#[derive(Default)]
pub struct FontCatalog {
    cache: RwLock<HashMap<String, Arc<Font<'static>>>>,
}

impl FontCatalog {
    /// Create an empty catalog backed by the system font database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a family name to a loaded face.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Font`] when neither the named family nor any
    /// fallback produced a usable face.
    pub fn resolve(&self, family: &str) -> RenderResult<Arc<Font<'static>>> {
        if let Some(font) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(family)
        {
            return Ok(Arc::clone(font));
        }

        let font = Arc::new(load_face(family)?);
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(family.to_string(), Arc::clone(&font));
        tracing::debug!("Resolved font family {family:?}");
        Ok(font)
    }
}

impl TextMeasurer for FontCatalog {
    fn text_width(&self, content: &str, font_family: &str, font_size: f32) -> Option<f32> {
        if content.is_empty() || font_size <= 0.0 {
            return None;
        }
        let font = self.resolve(font_family).ok()?;
        let width = advance_width(&font, content, font_size);
        (width > 0.0).then_some(width)
    }
}

/// Full advance width of a laid-out run, in pixels at the given size.
pub(crate) fn advance_width(font: &Font<'_>, content: &str, size: f32) -> f32 {
    let scale = Scale::uniform(size);
    let ascent = font.v_metrics(scale).ascent;
    font.layout(content, scale, point(0.0, ascent))
        .last()
        .map_or(0.0, |glyph| {
            glyph.position().x + glyph.unpositioned().h_metrics().advance_width
        })
}

fn load_face(family: &str) -> RenderResult<Font<'static>> {
    let generic = if SERIF_FAMILIES.contains(&family) {
        Family::Serif
    } else {
        Family::SansSerif
    };

    let db = system_db();
    for candidate in [Family::Name(family), generic, Family::SansSerif] {
        let query = Query {
            families: &[candidate],
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let Some(id) = db.query(&query) else {
            continue;
        };
        if let Some(font) = db.face(id).and_then(face_font) {
            return Ok(font);
        }
    }

    // Generic families are aliases for concrete names ("Arial", "Times New
    // Roman") the host may not ship, so the queries above can all miss even
    // on a machine full of fonts. Take any upright face before giving up.
    let mut faces: Vec<&FaceInfo> = db.faces().collect();
    faces.sort_by_key(|face| face.style != Style::Normal);
    for face in faces {
        if let Some(font) = face_font(face) {
            tracing::warn!(
                "Font family {family:?} unavailable, substituting {:?}",
                face.post_script_name
            );
            return Ok(font);
        }
    }

    Err(RenderError::Font(format!(
        "no usable face for family {family:?}"
    )))
}

fn face_font(face: &FaceInfo) -> Option<Font<'static>> {
    let bytes = match &face.source {
        Source::File(path) | Source::SharedFile(path, _) => match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::warn!("Unreadable font file {}: {error}", path.display());
                return None;
            }
        },
        Source::Binary(data) => data.as_ref().as_ref().to_vec(),
    };
    Font::try_from_vec(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_falls_back_to_an_installed_face() {
        let catalog = FontCatalog::new();
        // "Arial" is rarely installed on test hosts; the sans fallback
        // must still produce a face.
        assert!(catalog.resolve("Arial").is_ok());
        assert!(catalog.resolve("Times New Roman").is_ok());
    }

    #[test]
    fn test_measured_width_grows_with_size_and_content() {
        let catalog = FontCatalog::new();

        let small = catalog
            .text_width("Hello", "Arial", 16.0)
            .expect("measurable");
        let large = catalog
            .text_width("Hello", "Arial", 64.0)
            .expect("measurable");
        let longer = catalog
            .text_width("Hello world", "Arial", 16.0)
            .expect("measurable");

        assert!(small > 0.0);
        assert!(large > small);
        assert!(longer > small);
    }

    #[test]
    fn test_degenerate_text_is_unmeasurable() {
        let catalog = FontCatalog::new();
        assert_eq!(catalog.text_width("", "Arial", 32.0), None);
        assert_eq!(catalog.text_width("Hello", "Arial", 0.0), None);
        assert_eq!(catalog.text_width("Hello", "Arial", -4.0), None);
    }

    #[test]
    fn test_resolution_is_cached_per_family() {
        let catalog = FontCatalog::new();
        let first = catalog.resolve("Verdana").expect("resolvable");
        let second = catalog.resolve("Verdana").expect("resolvable");
        assert!(Arc::ptr_eq(&first, &second));
    }
}
