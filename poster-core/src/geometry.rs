//! Geometry primitives and hit-testing for the poster canvas.
//!
//! Everything here works in logical working-surface units: origin at the
//! top-left, y growing downward. The render pipeline applies a uniform scale
//! on top of these coordinates, so no function in this module knows about
//! screen or export resolutions.

use serde::{Deserialize, Serialize};

/// A point in logical canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate (y-down).
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// An axis-aligned rectangle in logical canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from its top-left corner and size.
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether the point lies inside the rectangle, edges inclusive.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// The rectangle grown by `amount` on every side.
    #[must_use]
    pub fn expand(&self, amount: f32) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }

    /// The rectangle shrunk by `amount` on every side, or `None` when the
    /// result would not have positive area.
    #[must_use]
    pub fn inset(&self, amount: f32) -> Option<Rect> {
        let width = self.width - 2.0 * amount;
        let height = self.height - 2.0 * amount;
        (width > 0.0 && height > 0.0)
            .then_some(Rect::new(self.x + amount, self.y + amount, width, height))
    }
}

/// A corner of an element's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corner {
    /// Top-left.
    Nw,
    /// Top-right.
    Ne,
    /// Bottom-left.
    Sw,
    /// Bottom-right.
    Se,
}

/// A resize handle: a fixed-size hit box centered on a bounds corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandleBox {
    /// Which corner this handle sits on.
    pub corner: Corner,
    /// The hit box, in logical units.
    pub rect: Rect,
}

/// The four corner resize handles for the given bounds.
///
/// Each handle is a `size`-by-`size` box centered on its corner.
#[must_use]
pub fn resize_handles(bounds: &Rect, size: f32) -> [HandleBox; 4] {
    let half = size / 2.0;
    let handle = |corner, cx: f32, cy: f32| HandleBox {
        corner,
        rect: Rect::new(cx - half, cy - half, size, size),
    };
    [
        handle(Corner::Nw, bounds.x, bounds.y),
        handle(Corner::Ne, bounds.right(), bounds.y),
        handle(Corner::Sw, bounds.x, bounds.bottom()),
        handle(Corner::Se, bounds.right(), bounds.bottom()),
    ]
}

/// The corner whose handle contains the point, if any.
#[must_use]
pub fn handle_at(bounds: &Rect, point: Point, size: f32) -> Option<Corner> {
    resize_handles(bounds, size)
        .into_iter()
        .find(|handle| handle.rect.contains(point))
        .map(|handle| handle.corner)
}

/// Whether the point falls on the selection border band around `bounds`.
///
/// The band is the region inside the bounds expanded by `band` on every side
/// but outside the bounds inset by `core_inset`. When the bounds are too
/// small for the inset to leave a core region, there is no band at all and
/// every point tests false.
#[must_use]
pub fn point_on_selection_border(point: Point, bounds: &Rect, band: f32, core_inset: f32) -> bool {
    let Some(core) = bounds.inset(core_inset) else {
        return false;
    };
    bounds.expand(band).contains(point) && !core.contains(point)
}

/// Text width measurement, supplied by whoever owns the font stack.
///
/// Element bounds for text are derived from the baseline anchor plus the
/// measured line width, so hit-testing needs the same metrics the renderer
/// paints with. Implementations return `None` when no face is available for
/// the family; callers treat that element as not interactable.
pub trait TextMeasurer {
    /// Width in logical units of `content` rendered at `font_size` in
    /// `font_family`, or `None` when measurement is unavailable.
    fn text_width(&self, content: &str, font_family: &str, font_size: f32) -> Option<f32>;
}

/// Deterministic [`TextMeasurer`] with a fixed per-character advance.
///
/// Useful headless, where no font stack exists: every character advances by
/// `font_size * advance_scale`. Not typographically accurate, but stable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedAdvanceMeasurer {
    /// Fraction of the font size each character advances by.
    pub advance_scale: f32,
}

impl Default for FixedAdvanceMeasurer {
    fn default() -> Self {
        Self { advance_scale: 0.5 }
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    #[allow(clippy::cast_precision_loss)]
    fn text_width(&self, content: &str, _font_family: &str, font_size: f32) -> Option<f32> {
        if content.is_empty() {
            return None;
        }
        Some(content.chars().count() as f32 * font_size * self.advance_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_is_edge_inclusive() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);

        assert!(rect.contains(Point::new(10.0, 20.0)));
        assert!(rect.contains(Point::new(110.0, 70.0)));
        assert!(rect.contains(Point::new(60.0, 45.0)));
        assert!(!rect.contains(Point::new(9.9, 45.0)));
        assert!(!rect.contains(Point::new(60.0, 70.1)));
    }

    #[test]
    fn test_expand_and_inset_are_symmetric() {
        let rect = Rect::new(10.0, 10.0, 100.0, 60.0);

        let grown = rect.expand(15.0);
        assert_eq!(grown, Rect::new(-5.0, -5.0, 130.0, 90.0));

        let shrunk = rect.inset(5.0).expect("rect is large enough");
        assert_eq!(shrunk, Rect::new(15.0, 15.0, 90.0, 50.0));
    }

    #[test]
    fn test_inset_degenerates_to_none() {
        let thin = Rect::new(0.0, 0.0, 8.0, 40.0);
        assert!(thin.inset(5.0).is_none());

        let flat = Rect::new(0.0, 0.0, 40.0, 10.0);
        assert!(flat.inset(5.0).is_none());
    }

    #[test]
    fn test_handles_are_centered_on_corners() {
        let bounds = Rect::new(100.0, 200.0, 50.0, 30.0);
        let handles = resize_handles(&bounds, 8.0);

        let nw = &handles[0];
        assert_eq!(nw.corner, Corner::Nw);
        assert_eq!(nw.rect, Rect::new(96.0, 196.0, 8.0, 8.0));

        let se = &handles[3];
        assert_eq!(se.corner, Corner::Se);
        assert_eq!(se.rect, Rect::new(146.0, 226.0, 8.0, 8.0));
    }

    #[test]
    fn test_handle_at_finds_the_right_corner() {
        let bounds = Rect::new(100.0, 200.0, 50.0, 30.0);

        assert_eq!(handle_at(&bounds, Point::new(100.0, 200.0), 8.0), Some(Corner::Nw));
        assert_eq!(handle_at(&bounds, Point::new(150.0, 230.0), 8.0), Some(Corner::Se));
        assert_eq!(handle_at(&bounds, Point::new(153.9, 199.0), 8.0), Some(Corner::Ne));
        assert_eq!(handle_at(&bounds, Point::new(125.0, 215.0), 8.0), None);
    }

    #[test]
    fn test_border_band_excludes_the_core() {
        let bounds = Rect::new(100.0, 100.0, 80.0, 40.0);

        // In the expanded ring.
        assert!(point_on_selection_border(Point::new(90.0, 100.0), &bounds, 15.0, 5.0));
        assert!(point_on_selection_border(Point::new(195.0, 155.0), &bounds, 15.0, 5.0));
        // On the bounds edge itself, outside the core.
        assert!(point_on_selection_border(Point::new(100.0, 100.0), &bounds, 15.0, 5.0));
        // Strictly inside the core.
        assert!(!point_on_selection_border(Point::new(140.0, 120.0), &bounds, 15.0, 5.0));
        // Beyond the band.
        assert!(!point_on_selection_border(Point::new(84.0, 100.0), &bounds, 15.0, 5.0));
    }

    #[test]
    fn test_border_band_is_false_everywhere_for_degenerate_bounds() {
        let degenerate = Rect::new(100.0, 100.0, 6.0, 40.0);

        for x in 80..130 {
            for y in 80..150 {
                #[allow(clippy::cast_precision_loss)]
                let point = Point::new(x as f32, y as f32);
                assert!(!point_on_selection_border(point, &degenerate, 15.0, 5.0));
            }
        }
    }

    #[test]
    fn test_fixed_advance_measurer() {
        let measurer = FixedAdvanceMeasurer::default();

        assert_eq!(measurer.text_width("Hello", "Arial", 32.0), Some(80.0));
        assert_eq!(measurer.text_width("", "Arial", 32.0), None);
    }
}
