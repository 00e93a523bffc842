//! Scene flattening for the working and export surfaces.
//!
//! One painter serves both surfaces. Coordinates, font sizes, and image
//! dimensions stay in logical working-surface units and are multiplied by a
//! single uniform scale per surface, so the on-screen preview and the final
//! export can never disagree about layout.

use std::io::Cursor;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use image::{Rgba, RgbaImage};
use poster_core::{resize_handles, Element, EngineConfig, Scene};

use crate::error::{RenderError, RenderResult};
use crate::fonts::FontCatalog;
use crate::raster;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const FALLBACK_FILL: Rgba<u8> = Rgba([248, 249, 250, 255]);

/// A finished export: encoded bytes plus the suggested download name.
#[derive(Debug, Clone)]
pub struct ExportBundle {
    /// PNG-encoded pixels.
    pub bytes: Vec<u8>,
    /// `final_poster_{epoch_millis}.png`.
    pub suggested_filename: String,
    /// Pixel width of the encoded image.
    pub width: u32,
    /// Pixel height of the encoded image.
    pub height: u32,
}

/// Flattens scenes into raster surfaces.
pub struct Compositor {
    catalog: Arc<FontCatalog>,
    config: EngineConfig,
}

impl Compositor {
    /// Create a compositor over a shared font catalog.
    #[must_use]
    pub fn new(catalog: Arc<FontCatalog>, config: EngineConfig) -> Self {
        Self { catalog, config }
    }

    /// Create a compositor with its own catalog and default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(FontCatalog::new()), EngineConfig::default())
    }

    /// The font catalog backing text measurement and painting.
    #[must_use]
    pub fn catalog(&self) -> &Arc<FontCatalog> {
        &self.catalog
    }

    /// Redraw the full scene into the working surface, decorations included.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn render_working(&self, scene: &Scene) -> RgbaImage {
        let mut surface = RgbaImage::new(
            self.config.canvas_width.round() as u32,
            self.config.canvas_height.round() as u32,
        );
        self.paint_scene(&mut surface, scene, 1.0);
        self.paint_decorations(&mut surface, scene, 1.0);
        surface
    }

    /// Flatten the scene into the export surface, without decorations.
    #[must_use]
    pub fn render_export(&self, scene: &Scene) -> RgbaImage {
        let mut surface = RgbaImage::new(self.config.export_width, self.config.export_height);
        self.paint_scene(&mut surface, scene, self.config.export_scale());
        surface
    }

    /// Flatten the scene and encode it as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Encode`] if PNG encoding fails; no partial
    /// output is produced.
    pub fn export_png(&self, scene: &Scene) -> RenderResult<ExportBundle> {
        let surface = self.render_export(scene);
        let (width, height) = surface.dimensions();
        let mut bytes = Cursor::new(Vec::new());
        surface
            .write_to(&mut bytes, image::ImageFormat::Png)
            .map_err(|error| RenderError::Encode(error.to_string()))?;
        let suggested_filename = format!("final_poster_{}.png", epoch_millis());
        tracing::debug!("Exported {width}x{height} poster as {suggested_filename}");
        Ok(ExportBundle {
            bytes: bytes.into_inner(),
            suggested_filename,
            width,
            height,
        })
    }

    /// Paint background and elements in sequence order.
    #[allow(clippy::cast_precision_loss)]
    fn paint_scene(&self, surface: &mut RgbaImage, scene: &Scene, scale: f32) {
        let fallback = raster::parse_hex_color(&self.config.fallback_fill).unwrap_or(FALLBACK_FILL);
        raster::fill(surface, fallback);
        if let Some(background) = scene.background() {
            raster::blit_scaled(
                surface,
                background,
                0.0,
                0.0,
                surface.width() as f32,
                surface.height() as f32,
            );
        }

        for element in scene.elements() {
            match element {
                Element::Text(text) => {
                    let font = match self.catalog.resolve(&text.font_family) {
                        Ok(font) => font,
                        Err(error) => {
                            tracing::warn!("Skipping text element: {error}");
                            continue;
                        }
                    };
                    let color = raster::parse_hex_color(&text.color).unwrap_or(BLACK);
                    raster::draw_text(
                        surface,
                        &font,
                        &text.content,
                        text.position.x * scale,
                        text.position.y * scale,
                        text.font_size * scale,
                        color,
                        text.align,
                    );
                }
                Element::Image(image) => {
                    raster::blit_scaled(
                        surface,
                        &image.bitmap,
                        image.position.x * scale,
                        image.position.y * scale,
                        image.width * scale,
                        image.height * scale,
                    );
                }
            }
        }
    }

    /// Paint the dashed outline and corner handles around the selection.
    fn paint_decorations(&self, surface: &mut RgbaImage, scene: &Scene, scale: f32) {
        let Some(element) = scene.selected_element() else {
            return;
        };
        let Some(bounds) = element.bounds(self.catalog.as_ref()) else {
            return;
        };
        let Some(stroke) = raster::parse_hex_color(&self.config.selection_color) else {
            return;
        };
        let handle_border =
            raster::parse_hex_color(&self.config.handle_border_color).unwrap_or(Rgba([255; 4]));

        let outline = bounds.expand(self.config.outline_pad);
        raster::stroke_dashed_rect(
            surface,
            outline.x * scale,
            outline.y * scale,
            outline.width * scale,
            outline.height * scale,
            self.config.outline_width * scale,
            self.config.dash_on * scale,
            self.config.dash_off * scale,
            stroke,
        );

        for handle in resize_handles(&bounds, self.config.handle_size) {
            let rect = handle.rect;
            raster::fill_rect(
                surface,
                rect.x * scale,
                rect.y * scale,
                rect.width * scale,
                rect.height * scale,
                stroke,
            );
            raster::stroke_rect(
                surface,
                rect.x * scale,
                rect.y * scale,
                rect.width * scale,
                rect.height * scale,
                handle_border,
            );
        }
    }
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

#[cfg(test)]
mod tests {
    use poster_core::{Bitmap, ImageElement, Point};

    use super::*;

    const SELECTION_BLUE: Rgba<u8> = Rgba([0, 123, 255, 255]);

    fn red_image(x: f32, y: f32, size: f32) -> Element {
        Element::Image(ImageElement {
            position: Point::new(x, y),
            width: size,
            height: size,
            bitmap: Arc::new(Bitmap::solid(4, 4, [200, 30, 30, 255])),
            source_aspect: 1.0,
            qr: None,
        })
    }

    #[test]
    fn test_empty_scene_exports_flat_fallback() {
        let compositor = Compositor::with_defaults();
        let surface = compositor.render_export(&Scene::new());

        assert_eq!(surface.dimensions(), (1024, 1536));
        let fallback = Rgba([248, 249, 250, 255]);
        assert_eq!(*surface.get_pixel(0, 0), fallback);
        assert_eq!(*surface.get_pixel(512, 768), fallback);
        assert_eq!(*surface.get_pixel(1023, 1535), fallback);
    }

    #[test]
    fn test_working_surface_has_canvas_dimensions() {
        let compositor = Compositor::with_defaults();
        let surface = compositor.render_working(&Scene::new());
        assert_eq!(surface.dimensions(), (800, 1200));
    }

    #[test]
    fn test_background_covers_the_fallback() {
        let compositor = Compositor::with_defaults();
        let mut scene = Scene::new();
        scene.set_background(Some(Arc::new(Bitmap::solid(8, 8, [10, 200, 10, 255]))));

        let working = compositor.render_working(&scene);
        let export = compositor.render_export(&scene);

        assert_eq!(*working.get_pixel(400, 600), Rgba([10, 200, 10, 255]));
        assert_eq!(*export.get_pixel(512, 768), Rgba([10, 200, 10, 255]));
    }

    #[test]
    fn test_selection_decorations_on_working_surface_only() {
        let compositor = Compositor::with_defaults();
        let mut scene = Scene::new();
        let index = scene.add_element(red_image(100.0, 100.0, 100.0));
        scene.select(Some(index));

        let working = compositor.render_working(&scene);
        // Dashed outline ring sits on the bounds expanded by five.
        assert_eq!(*working.get_pixel(95, 95), SELECTION_BLUE);
        // Handle squares sit on the unexpanded corners, white-bordered.
        assert_eq!(*working.get_pixel(100, 100), SELECTION_BLUE);
        assert_eq!(*working.get_pixel(96, 96), Rgba([255, 255, 255, 255]));

        let export = compositor.render_export(&scene);
        assert!(export
            .pixels()
            .all(|pixel| *pixel != SELECTION_BLUE));
    }

    #[test]
    fn test_unselected_scene_has_no_decorations() {
        let compositor = Compositor::with_defaults();
        let mut scene = Scene::new();
        scene.add_element(red_image(100.0, 100.0, 100.0));

        let working = compositor.render_working(&scene);
        assert!(working
            .pixels()
            .all(|pixel| *pixel != SELECTION_BLUE));
    }

    #[test]
    fn test_image_paints_at_scaled_position_on_export() {
        let compositor = Compositor::with_defaults();
        let mut scene = Scene::new();
        scene.add_element(red_image(100.0, 100.0, 100.0));

        let export = compositor.render_export(&scene);
        // 1.28 scale: the image spans (128, 128) to (256, 256).
        assert_eq!(*export.get_pixel(130, 130), Rgba([200, 30, 30, 255]));
        assert_eq!(*export.get_pixel(250, 250), Rgba([200, 30, 30, 255]));
        assert_eq!(*export.get_pixel(120, 130), Rgba([248, 249, 250, 255]));
    }

    #[test]
    fn test_export_bundle_carries_name_and_dimensions() {
        let compositor = Compositor::with_defaults();
        let bundle = compositor
            .export_png(&Scene::new())
            .expect("export succeeds");

        assert_eq!((bundle.width, bundle.height), (1024, 1536));
        assert!(!bundle.bytes.is_empty());
        assert!(bundle.suggested_filename.starts_with("final_poster_"));
        assert!(bundle.suggested_filename.ends_with(".png"));
        let stamp = bundle
            .suggested_filename
            .trim_start_matches("final_poster_")
            .trim_end_matches(".png");
        assert!(stamp.parse::<u128>().is_ok());

        // PNG magic bytes.
        assert_eq!(&bundle.bytes[0..4], &[0x89, 0x50, 0x4E, 0x47]);
    }
}
