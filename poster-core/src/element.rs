//! Poster elements - the text and image building blocks of a scene.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{PosterError, PosterResult};
use crate::geometry::{Point, Rect, TextMeasurer};

/// Horizontal text alignment relative to the anchor x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Anchor x is the left edge of the line.
    #[default]
    Left,
    /// Anchor x is the center of the line.
    Center,
    /// Anchor x is the right edge of the line.
    Right,
}

/// A decoded RGBA8 bitmap, immutable once loaded.
///
/// Scenes hold bitmaps behind [`Arc`] so whole-value element replacement
/// stays cheap; the pixel buffer itself is never mutated after decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Wrap a raw RGBA8 buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer length does not equal
    /// `width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> PosterResult<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(PosterError::BitmapSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A bitmap filled with a single color.
    #[must_use]
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The RGBA8 pixel buffer, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Native width / height ratio.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// QR provenance carried on image elements, for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrMetadata {
    /// The text the QR code was generated from.
    pub text: String,
    /// The QR payload kind reported by the generator (url, wifi, ...).
    pub kind: String,
}

/// One pre-rendered QR code as handed over by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeSource {
    /// Encoded bitmap as a `data:image/...` URI.
    #[serde(rename = "dataURL")]
    pub data_url: String,
    /// Origin text.
    pub text: String,
    /// Payload kind.
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable rendering of the payload.
    pub formatted_data: String,
}

impl QrCodeSource {
    /// Parse a batch of QR sources from the generator's JSON output.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe an array of sources.
    pub fn parse_batch(json: &str) -> PosterResult<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    /// The display metadata carried onto the placed element.
    #[must_use]
    pub fn metadata(&self) -> QrMetadata {
        QrMetadata {
            text: self.text.clone(),
            kind: self.kind.clone(),
        }
    }
}

/// A text element anchored at its baseline.
///
/// `position.y` is the baseline, `position.x` the alignment anchor, matching
/// canvas text semantics. Bounds are derived from the anchor and measured
/// width on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    /// Baseline anchor point.
    pub position: Point,
    /// Text content, single line.
    pub content: String,
    /// Font size in logical units, kept within the engine's clamp range.
    pub font_size: f32,
    /// Fill color as a CSS hex string.
    pub color: String,
    /// Font family name.
    pub font_family: String,
    /// Horizontal alignment relative to the anchor.
    pub align: TextAlign,
}

/// An image element: a placed QR code, logo, or upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageElement {
    /// Top-left corner.
    pub position: Point,
    /// Display width, independent of the bitmap's native size.
    pub width: f32,
    /// Display height, independent of the bitmap's native size.
    pub height: f32,
    /// Decoded pixels, shared and immutable.
    pub bitmap: Arc<Bitmap>,
    /// Native width / height at load time. A sizing hint only; width and
    /// height may drift from it after independent resizes.
    pub source_aspect: f32,
    /// QR provenance when this image came from the generator.
    pub qr: Option<QrMetadata>,
}

/// A placed poster element. Scene sequence order is paint order.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Baseline-anchored styled text.
    Text(TextElement),
    /// A decoded bitmap with a mutable display size.
    Image(ImageElement),
}

impl Element {
    /// The element's anchor position.
    #[must_use]
    pub fn position(&self) -> Point {
        match self {
            Element::Text(text) => text.position,
            Element::Image(image) => image.position,
        }
    }

    /// Move the element's anchor.
    pub fn set_position(&mut self, position: Point) {
        match self {
            Element::Text(text) => text.position = position,
            Element::Image(image) => image.position = position,
        }
    }

    /// Borrow the text variant, if this is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&TextElement> {
        match self {
            Element::Text(text) => Some(text),
            Element::Image(_) => None,
        }
    }

    /// Borrow the image variant, if this is one.
    #[must_use]
    pub fn as_image(&self) -> Option<&ImageElement> {
        match self {
            Element::Image(image) => Some(image),
            Element::Text(_) => None,
        }
    }

    /// Whether this is a text element.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Element::Text(_))
    }

    /// The element's bounding box in logical units.
    ///
    /// Text bounds hang from the baseline anchor: `y - font_size` up to the
    /// baseline, measured line width across. Returns `None` for degenerate
    /// text (empty content, non-positive size, or no measurable face); such
    /// an element is not interactable and draws no selection decoration.
    #[must_use]
    pub fn bounds(&self, measurer: &dyn TextMeasurer) -> Option<Rect> {
        match self {
            Element::Text(text) => {
                if text.content.is_empty() || text.font_size <= 0.0 {
                    return None;
                }
                let width = measurer.text_width(&text.content, &text.font_family, text.font_size)?;
                Some(Rect::new(
                    text.position.x,
                    text.position.y - text.font_size,
                    width,
                    text.font_size,
                ))
            }
            Element::Image(image) => Some(Rect::new(
                image.position.x,
                image.position.y,
                image.width,
                image.height,
            )),
        }
    }
}
