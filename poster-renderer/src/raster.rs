//! CPU raster primitives shared by the working and export surfaces.
//!
//! Everything here takes device-pixel coordinates; the compositor multiplies
//! logical units by the surface scale before calling down.

use image::{imageops, Rgba, RgbaImage};
use poster_core::{Bitmap, TextAlign};
use rusttype::{point, Font, Scale};

use crate::fonts::advance_width;

/// Parse a `#rgb` or `#rrggbb` CSS hex color into an opaque RGBA pixel.
#[must_use]
pub fn parse_hex_color(hex: &str) -> Option<Rgba<u8>> {
    let digits = hex.strip_prefix('#')?;
    if !digits.is_ascii() {
        return None;
    }
    match digits.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, ch) in rgb.iter_mut().zip(digits.chars()) {
                let nibble = u8::try_from(ch.to_digit(16)?).ok()?;
                *slot = nibble * 17;
            }
            Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
        }
        6 => {
            let mut rgb = [0u8; 3];
            for (index, slot) in rgb.iter_mut().enumerate() {
                *slot = u8::from_str_radix(&digits[index * 2..index * 2 + 2], 16).ok()?;
            }
            Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
        }
        _ => None,
    }
}

/// Flood the whole surface with one color.
pub fn fill(surface: &mut RgbaImage, color: Rgba<u8>) {
    for pixel in surface.pixels_mut() {
        *pixel = color;
    }
}

/// Source-over blend of one pixel, skipping coordinates off the surface.
///
/// `coverage` scales the color's alpha; glyph rasterisation supplies
/// fractional coverage for anti-aliased edges.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn blend_pixel(surface: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    if x >= surface.width() || y >= surface.height() {
        return;
    }
    let alpha = (f32::from(color[3]) / 255.0 * coverage).clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let inv = 1.0 - alpha;
    let dst = surface.get_pixel_mut(x, y);
    for channel in 0..3 {
        let blended = f32::from(color[channel]).mul_add(alpha, f32::from(dst[channel]) * inv);
        dst[channel] = blended.round() as u8;
    }
    dst[3] = dst[3].max((alpha * 255.0).round() as u8);
}

/// Resample a bitmap to the destination size and composite it source-over.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn blit_scaled(
    surface: &mut RgbaImage,
    bitmap: &Bitmap,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
) {
    if width < 1.0 || height < 1.0 {
        return;
    }
    let Some(source) =
        RgbaImage::from_raw(bitmap.width(), bitmap.height(), bitmap.pixels().to_vec())
    else {
        return;
    };
    let scaled = imageops::resize(
        &source,
        width.round() as u32,
        height.round() as u32,
        imageops::FilterType::Lanczos3,
    );
    let origin_x = x.round() as i64;
    let origin_y = y.round() as i64;
    for (px, py, pixel) in scaled.enumerate_pixels() {
        blend_pixel(
            surface,
            origin_x + i64::from(px),
            origin_y + i64::from(py),
            *pixel,
            1.0,
        );
    }
}

/// Paint a run of glyphs with its baseline at `(anchor_x, baseline_y)`.
///
/// The anchor is interpreted per the alignment: left edge, center, or right
/// edge of the measured run.
#[allow(clippy::too_many_arguments)]
pub fn draw_text(
    surface: &mut RgbaImage,
    font: &Font<'_>,
    content: &str,
    anchor_x: f32,
    baseline_y: f32,
    size: f32,
    color: Rgba<u8>,
    align: TextAlign,
) {
    if content.is_empty() || size <= 0.0 {
        return;
    }
    let scale = Scale::uniform(size);
    let width = advance_width(font, content, size);
    let left = match align {
        TextAlign::Left => anchor_x,
        TextAlign::Center => anchor_x - width / 2.0,
        TextAlign::Right => anchor_x - width,
    };
    for glyph in font.layout(content, scale, point(left, baseline_y)) {
        let Some(bounds) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            blend_pixel(
                surface,
                i64::from(bounds.min.x) + i64::from(gx),
                i64::from(bounds.min.y) + i64::from(gy),
                color,
                coverage,
            );
        });
    }
}

/// Fill an axis-aligned rectangle.
#[allow(clippy::cast_possible_truncation)]
pub fn fill_rect(
    surface: &mut RgbaImage,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    color: Rgba<u8>,
) {
    if width <= 0.0 || height <= 0.0 {
        return;
    }
    let x0 = x.round() as i64;
    let y0 = y.round() as i64;
    for dy in 0..height.round() as i64 {
        for dx in 0..width.round() as i64 {
            blend_pixel(surface, x0 + dx, y0 + dy, color, 1.0);
        }
    }
}

/// Stroke a one-pixel rectangle border.
#[allow(clippy::cast_possible_truncation)]
pub fn stroke_rect(
    surface: &mut RgbaImage,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    color: Rgba<u8>,
) {
    if width <= 0.0 || height <= 0.0 {
        return;
    }
    let x0 = x.round() as i64;
    let y0 = y.round() as i64;
    let w = width.round() as i64;
    let h = height.round() as i64;
    for dx in 0..w {
        blend_pixel(surface, x0 + dx, y0, color, 1.0);
        blend_pixel(surface, x0 + dx, y0 + h - 1, color, 1.0);
    }
    for dy in 0..h {
        blend_pixel(surface, x0, y0 + dy, color, 1.0);
        blend_pixel(surface, x0 + w - 1, y0 + dy, color, 1.0);
    }
}

/// Stroke a dashed rectangle outline.
///
/// The dash phase runs continuously around the perimeter; each "on" step
/// paints a `stroke`-sized square centered on the path, which matches how a
/// 2D canvas strokes a dashed path of that line width.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::too_many_arguments
)]
pub fn stroke_dashed_rect(
    surface: &mut RgbaImage,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    stroke: f32,
    dash_on: f32,
    dash_off: f32,
    color: Rgba<u8>,
) {
    if width <= 0.0 || height <= 0.0 {
        return;
    }
    let corners = [
        (x, y),
        (x + width, y),
        (x + width, y + height),
        (x, y + height),
    ];
    let period = dash_on + dash_off;
    let mut travelled = 0.0_f32;
    for index in 0..4 {
        let (sx, sy) = corners[index];
        let (ex, ey) = corners[(index + 1) % 4];
        let len = ((ex - sx).powi(2) + (ey - sy).powi(2)).sqrt();
        let steps = len.ceil() as i64;
        for step in 0..steps {
            let t = step as f32;
            let phase = if period > 0.0 {
                (travelled + t).rem_euclid(period)
            } else {
                0.0
            };
            if phase >= dash_on {
                continue;
            }
            let px = sx + (ex - sx) * (t / len);
            let py = sy + (ey - sy) * (t / len);
            paint_square(surface, px, py, stroke, color);
        }
        travelled += len;
    }
}

#[allow(clippy::cast_possible_truncation)]
fn paint_square(surface: &mut RgbaImage, cx: f32, cy: f32, size: f32, color: Rgba<u8>) {
    let half = size / 2.0;
    let x0 = (cx - half).round() as i64;
    let y0 = (cy - half).round() as i64;
    let extent = size.round().max(1.0) as i64;
    for dy in 0..extent {
        for dx in 0..extent {
            blend_pixel(surface, x0 + dx, y0 + dy, color, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 123, 255, 255]);

    #[test]
    fn test_parse_hex_color_forms() {
        assert_eq!(parse_hex_color("#007bff"), Some(Rgba([0, 123, 255, 255])));
        assert_eq!(parse_hex_color("#f8f9fa"), Some(Rgba([248, 249, 250, 255])));
        assert_eq!(parse_hex_color("#fff"), Some(Rgba([255, 255, 255, 255])));
        assert_eq!(parse_hex_color("#000"), Some(Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn test_parse_hex_color_rejects_garbage() {
        assert_eq!(parse_hex_color("007bff"), None);
        assert_eq!(parse_hex_color("#07bff"), None);
        assert_eq!(parse_hex_color("#gggggg"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
        assert_eq!(parse_hex_color(""), None);
    }

    #[test]
    fn test_fill_covers_every_pixel() {
        let mut surface = RgbaImage::new(4, 4);
        fill(&mut surface, BLUE);
        assert!(surface.pixels().all(|pixel| *pixel == BLUE));
    }

    #[test]
    fn test_blend_pixel_ignores_out_of_range() {
        let mut surface = RgbaImage::new(4, 4);
        fill(&mut surface, WHITE);
        blend_pixel(&mut surface, -1, 0, BLUE, 1.0);
        blend_pixel(&mut surface, 0, -1, BLUE, 1.0);
        blend_pixel(&mut surface, 4, 0, BLUE, 1.0);
        blend_pixel(&mut surface, 0, 4, BLUE, 1.0);
        assert!(surface.pixels().all(|pixel| *pixel == WHITE));
    }

    #[test]
    fn test_blend_pixel_half_coverage_mixes() {
        let mut surface = RgbaImage::new(1, 1);
        fill(&mut surface, Rgba([0, 0, 0, 255]));
        blend_pixel(&mut surface, 0, 0, WHITE, 0.5);
        let pixel = surface.get_pixel(0, 0);
        assert_eq!(pixel[0], 128);
        assert_eq!(pixel[3], 255);
    }

    #[test]
    fn test_fill_rect_stays_inside_its_region() {
        let mut surface = RgbaImage::new(10, 10);
        fill(&mut surface, WHITE);
        fill_rect(&mut surface, 2.0, 3.0, 4.0, 2.0, BLUE);

        assert_eq!(*surface.get_pixel(2, 3), BLUE);
        assert_eq!(*surface.get_pixel(5, 4), BLUE);
        assert_eq!(*surface.get_pixel(1, 3), WHITE);
        assert_eq!(*surface.get_pixel(6, 3), WHITE);
        assert_eq!(*surface.get_pixel(2, 5), WHITE);
    }

    #[test]
    fn test_stroke_rect_leaves_the_interior() {
        let mut surface = RgbaImage::new(10, 10);
        fill(&mut surface, WHITE);
        stroke_rect(&mut surface, 1.0, 1.0, 6.0, 6.0, BLUE);

        assert_eq!(*surface.get_pixel(1, 1), BLUE);
        assert_eq!(*surface.get_pixel(6, 6), BLUE);
        assert_eq!(*surface.get_pixel(3, 3), WHITE);
    }

    #[test]
    fn test_dashed_stroke_alternates_on_and_off() {
        let mut surface = RgbaImage::new(64, 64);
        fill(&mut surface, WHITE);
        stroke_dashed_rect(&mut surface, 10.0, 10.0, 40.0, 30.0, 2.0, 5.0, 5.0, BLUE);

        // First dash of the top edge is on; the following gap is off.
        assert_eq!(*surface.get_pixel(10, 10), BLUE);
        assert_eq!(*surface.get_pixel(16, 10), WHITE);
        // Interior is untouched.
        assert_eq!(*surface.get_pixel(30, 25), WHITE);
    }

    #[test]
    fn test_blit_scaled_fills_the_destination() {
        let mut surface = RgbaImage::new(20, 20);
        fill(&mut surface, WHITE);
        let bitmap = Bitmap::solid(2, 2, [255, 0, 0, 255]);
        blit_scaled(&mut surface, &bitmap, 5.0, 5.0, 8.0, 8.0);

        assert_eq!(*surface.get_pixel(5, 5), Rgba([255, 0, 0, 255]));
        assert_eq!(*surface.get_pixel(12, 12), Rgba([255, 0, 0, 255]));
        assert_eq!(*surface.get_pixel(4, 5), WHITE);
        assert_eq!(*surface.get_pixel(13, 5), WHITE);
    }

    #[test]
    fn test_blit_respects_source_alpha() {
        let mut surface = RgbaImage::new(8, 8);
        fill(&mut surface, WHITE);
        let bitmap = Bitmap::solid(2, 2, [255, 0, 0, 0]);
        blit_scaled(&mut surface, &bitmap, 0.0, 0.0, 4.0, 4.0);

        assert!(surface.pixels().all(|pixel| *pixel == WHITE));
    }
}
