//! Pointer input events and cursor affordances.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// A pointer event in logical canvas coordinates.
///
/// The embedder translates its native input (mouse, touch, test script) into
/// these before handing them to the session. Coordinates are working-surface
/// units; converting from display pixels is the embedder's job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Primary button pressed.
    PointerDown {
        /// Pointer position.
        position: Point,
    },
    /// Pointer moved, pressed or not.
    PointerMove {
        /// Pointer position.
        position: Point,
    },
    /// Primary button released.
    PointerUp,
    /// Primary button double-clicked.
    DoubleClick {
        /// Pointer position.
        position: Point,
    },
}

/// Cursor affordance computed while hovering the canvas.
///
/// Variants map onto the CSS cursor keywords the original editor surface
/// used, via [`CursorHint::css_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorHint {
    /// Nothing interactable under the pointer.
    #[default]
    Default,
    /// Border band or image interior: the element can be dragged.
    Move,
    /// Text interior: a caret could be placed here.
    Text,
    /// Nw or Se handle: diagonal resize.
    ResizeNwSe,
    /// Ne or Sw handle: the other diagonal.
    ResizeNeSw,
}

impl CursorHint {
    /// The CSS cursor keyword for this hint.
    #[must_use]
    pub fn css_name(self) -> &'static str {
        match self {
            CursorHint::Default => "default",
            CursorHint::Move => "move",
            CursorHint::Text => "text",
            CursorHint::ResizeNwSe => "nw-resize",
            CursorHint::ResizeNeSw => "ne-resize",
        }
    }
}

impl std::fmt::Display for CursorHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.css_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_hints_map_to_css_keywords() {
        assert_eq!(CursorHint::Default.css_name(), "default");
        assert_eq!(CursorHint::ResizeNwSe.css_name(), "nw-resize");
        assert_eq!(CursorHint::ResizeNeSw.to_string(), "ne-resize");
    }

    #[test]
    fn test_input_events_round_trip_json() {
        let event = InputEvent::PointerDown {
            position: Point::new(10.0, 20.0),
        };

        let json = serde_json::to_string(&event).expect("serializes");
        let back: InputEvent = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, event);
    }
}
