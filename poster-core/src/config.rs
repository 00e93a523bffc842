//! Engine configuration constants.
//!
//! All the fixed numbers the editor depends on, exposed as named fields so
//! embedders and tests can reach them. [`EngineConfig::default`] carries the
//! production values.

use serde::{Deserialize, Serialize};

use crate::element::{TextAlign, TextElement};
use crate::geometry::Point;

/// Font families offered by the floating text toolbar.
pub const FONT_FAMILIES: [&str; 6] = [
    "Arial",
    "Times New Roman",
    "Helvetica",
    "Georgia",
    "Verdana",
    "Impact",
];

/// Preset font sizes offered by the floating text toolbar.
pub const FONT_SIZE_PRESETS: [f32; 14] = [
    12.0, 14.0, 16.0, 18.0, 20.0, 24.0, 28.0, 32.0, 36.0, 42.0, 48.0, 56.0, 64.0, 72.0,
];

/// Named constants for the poster engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Working surface width in logical units.
    pub canvas_width: f32,
    /// Working surface height in logical units.
    pub canvas_height: f32,
    /// Export surface width in pixels.
    pub export_width: u32,
    /// Export surface height in pixels.
    pub export_height: u32,
    /// Edge length of a corner resize handle.
    pub handle_size: f32,
    /// Thickness of the selection border band around element bounds.
    pub border_band: f32,
    /// Inset from the bounds to the band's inner (core) edge.
    pub border_core_inset: f32,
    /// Minimum image width/height after a resize.
    pub min_image_dim: f32,
    /// Lower font size clamp.
    pub min_font_size: f32,
    /// Upper font size clamp.
    pub max_font_size: f32,
    /// Step applied by the toolbar's font size buttons.
    pub font_size_step: f32,
    /// Padding between element bounds and the dashed selection outline.
    pub outline_pad: f32,
    /// Stroke width of the dashed selection outline.
    pub outline_width: f32,
    /// Painted run length of the dashed outline.
    pub dash_on: f32,
    /// Gap length of the dashed outline.
    pub dash_off: f32,
    /// Horizontal toolbar offset from the text anchor.
    pub toolbar_offset_x: f32,
    /// Minimum toolbar distance from the viewport edges.
    pub toolbar_margin: f32,
    /// Horizontal space reserved for the toolbar when clamping.
    pub toolbar_width: f32,
    /// Flat fill used when no background is loaded.
    pub fallback_fill: String,
    /// Selection outline and handle fill color.
    pub selection_color: String,
    /// Handle square border color.
    pub handle_border_color: String,
    /// Content of newly created text elements.
    pub default_text_content: String,
    /// Anchor of newly created text elements.
    pub default_text_position: Point,
    /// Font size of newly created text elements.
    pub default_font_size: f32,
    /// Color of newly created text elements.
    pub default_text_color: String,
    /// Font family of newly created text elements.
    pub default_font_family: String,
    /// Edge length of auto-ingested QR codes.
    pub qr_size: f32,
    /// Position of the first QR code.
    pub qr_origin: Point,
    /// Diagonal stagger between consecutive QR codes.
    pub qr_step: f32,
    /// Display width of uploaded logos.
    pub logo_width: f32,
    /// Position of the first uploaded logo.
    pub logo_origin: Point,
    /// Horizontal spacing between uploaded logos.
    pub logo_step_x: f32,
    /// Most files accepted per QR upload batch.
    pub max_qr_uploads: usize,
    /// Most files accepted per logo upload batch.
    pub max_logo_uploads: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 1200.0,
            export_width: 1024,
            export_height: 1536,
            handle_size: 8.0,
            border_band: 15.0,
            border_core_inset: 5.0,
            min_image_dim: 20.0,
            min_font_size: 12.0,
            max_font_size: 100.0,
            font_size_step: 2.0,
            outline_pad: 5.0,
            outline_width: 2.0,
            dash_on: 5.0,
            dash_off: 5.0,
            toolbar_offset_x: 200.0,
            toolbar_margin: 10.0,
            toolbar_width: 400.0,
            fallback_fill: "#f8f9fa".to_string(),
            selection_color: "#007bff".to_string(),
            handle_border_color: "#ffffff".to_string(),
            default_text_content: "Your text here".to_string(),
            default_text_position: Point::new(100.0, 150.0),
            default_font_size: 32.0,
            default_text_color: "#000000".to_string(),
            default_font_family: "Arial".to_string(),
            qr_size: 150.0,
            qr_origin: Point::new(300.0, 900.0),
            qr_step: 20.0,
            logo_width: 120.0,
            logo_origin: Point::new(50.0, 1050.0),
            logo_step_x: 140.0,
            max_qr_uploads: 1,
            max_logo_uploads: 3,
        }
    }
}

impl EngineConfig {
    /// Uniform scale from working-surface units to export pixels.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn export_scale(&self) -> f32 {
        self.export_width as f32 / self.canvas_width
    }

    /// A text element carrying the editor defaults.
    #[must_use]
    pub fn default_text_element(&self) -> TextElement {
        TextElement {
            position: self.default_text_position,
            content: self.default_text_content.clone(),
            font_size: self.default_font_size,
            color: self.default_text_color.clone(),
            font_family: self.default_font_family.clone(),
            align: TextAlign::default(),
        }
    }
}
