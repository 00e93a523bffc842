//! Poster Editing Integration Tests
//!
//! Walks complete editing workflows through the session state machine:
//! - Selecting, dragging, and restyling the starter text
//! - In-place text editing with commit on click-away
//! - Layering and per-corner image resizing
//! - Driving the session from a serialized event stream

use std::sync::Arc;

use poster_core::{
    Bitmap, EditorSession, Element, FixedAdvanceMeasurer, ImageElement, InputEvent, Interaction,
    Point, TextAlign,
};

/// Half-advance metrics keep every expected width easy to derive by hand.
const M: FixedAdvanceMeasurer = FixedAdvanceMeasurer { advance_scale: 0.5 };

fn red_square(x: f32, y: f32, size: f32) -> ImageElement {
    ImageElement {
        position: Point::new(x, y),
        width: size,
        height: size,
        bitmap: Arc::new(Bitmap::solid(2, 2, [255, 0, 0, 255])),
        source_aspect: 1.0,
        qr: None,
    }
}

fn selected_font_size(session: &EditorSession) -> f32 {
    session
        .scene()
        .selected_text()
        .expect("a text element is selected")
        .font_size
}

// ============================================================================
// Headline workflow
// ============================================================================

#[test]
fn test_full_headline_editing_workflow() {
    let mut session = EditorSession::default();

    // The user adds the starter text; it comes in selected with the toolbar
    // anchored beside it.
    session.add_default_text();
    assert_eq!(session.interaction(), &Interaction::Selected { index: 0 });
    let anchor = session.toolbar_anchor().expect("toolbar visible");
    assert!((anchor.x - 300.0).abs() < f32::EPSILON);
    assert!((anchor.y - 118.0).abs() < f32::EPSILON);

    // "Your text here" at 32pt measures 224 wide, so bounds span
    // (100, 118)..(324, 150). A press just inside the left edge sits on the
    // border band and starts a drag.
    session.pointer_down(Point::new(102.0, 130.0), &M);
    assert!(matches!(
        session.interaction(),
        Interaction::Dragging { index: 0, .. }
    ));
    session.pointer_move(Point::new(202.0, 230.0), &M);
    session.pointer_up();

    let element = session.scene().element(0).expect("text kept");
    assert_eq!(element.position(), Point::new(200.0, 250.0));
    let anchor = session.toolbar_anchor().expect("toolbar follows");
    assert!((anchor.x - 400.0).abs() < f32::EPSILON);
    assert!((anchor.y - 218.0).abs() < f32::EPSILON);

    // Double-click in the interior opens the editor; the committed buffer
    // replaces the content when the user clicks away.
    session.double_click(Point::new(250.0, 230.0), &M);
    assert!(matches!(session.interaction(), Interaction::EditingText { .. }));
    session.set_edit_buffer("Launch Party");
    session.pointer_down(Point::new(600.0, 800.0), &M);
    assert_eq!(session.interaction(), &Interaction::Idle);
    let text = session.scene().element(0).and_then(Element::as_text);
    assert_eq!(text.expect("text kept").content, "Launch Party");

    // Clicking the body of an unselected text selects it without dragging.
    session.pointer_down(Point::new(210.0, 230.0), &M);
    assert_eq!(session.interaction(), &Interaction::Selected { index: 0 });

    // Style edits land on the selection.
    session.increase_font_size();
    session.set_text_align(TextAlign::Center);
    session.set_text_color("#ff0000");
    let text = session.scene().selected_text().expect("selected");
    assert!((text.font_size - 34.0).abs() < f32::EPSILON);
    assert_eq!(text.align, TextAlign::Center);
    assert_eq!(text.color, "#ff0000");

    // An image layered on top wins the next hit test.
    session.insert_image(red_square(150.0, 200.0, 100.0));
    session.pointer_down(Point::new(210.0, 230.0), &M);
    assert!(matches!(
        session.interaction(),
        Interaction::Dragging { index: 1, .. }
    ));
    session.pointer_up();

    // Deleting the image leaves the text and hides the toolbar until the
    // next selection.
    session.delete_selected();
    assert_eq!(session.scene().element_count(), 1);
    assert_eq!(session.interaction(), &Interaction::Idle);
    assert!(session.toolbar_anchor().is_none());

    session.clear();
    assert_eq!(session.scene().element_count(), 0);
    assert!(session.scene().background().is_none());
}

// ============================================================================
// Image resizing
// ============================================================================

#[test]
fn test_image_resize_from_both_diagonals() {
    let mut session = EditorSession::default();
    session.insert_image(red_square(100.0, 100.0, 100.0));

    // Select with a click; images drag immediately, so release to settle.
    session.pointer_down(Point::new(150.0, 150.0), &M);
    session.pointer_up();
    assert_eq!(session.interaction(), &Interaction::Selected { index: 0 });

    // South-east handle grows the box, then collapsing it hits the floor.
    session.pointer_down(Point::new(200.0, 200.0), &M);
    assert!(matches!(
        session.interaction(),
        Interaction::Resizing { index: 0, .. }
    ));
    session.pointer_move(Point::new(260.0, 240.0), &M);
    let image = session.scene().element(0).and_then(Element::as_image);
    let image = image.expect("image kept");
    assert!((image.width - 160.0).abs() < f32::EPSILON);
    assert!((image.height - 140.0).abs() < f32::EPSILON);

    session.pointer_move(Point::new(110.0, 115.0), &M);
    let image = session.scene().element(0).and_then(Element::as_image);
    let image = image.expect("image kept");
    assert!((image.width - 20.0).abs() < f32::EPSILON);
    assert!((image.height - 20.0).abs() < f32::EPSILON);
    session.pointer_up();

    // South-west handle moves the left edge while the right edge stays put.
    session.pointer_down(Point::new(100.0, 120.0), &M);
    session.pointer_move(Point::new(80.0, 130.0), &M);
    session.pointer_up();
    let image = session.scene().element(0).and_then(Element::as_image);
    let image = image.expect("image kept");
    assert_eq!(image.position, Point::new(80.0, 100.0));
    assert!((image.width - 40.0).abs() < f32::EPSILON);
    assert!((image.height - 30.0).abs() < f32::EPSILON);
}

// ============================================================================
// Serialized event streams
// ============================================================================

#[test]
fn test_json_event_stream_drives_the_session() {
    let mut session = EditorSession::default();
    session.insert_image(red_square(400.0, 600.0, 100.0));

    // An embedder replaying its input log: press, drag, release, then a
    // double-click that lands on the image and is ignored.
    let script = r#"[
        {"type": "pointer_down", "position": {"x": 450.0, "y": 650.0}},
        {"type": "pointer_move", "position": {"x": 500.0, "y": 670.0}},
        {"type": "pointer_up"},
        {"type": "double_click", "position": {"x": 460.0, "y": 630.0}}
    ]"#;
    let events: Vec<InputEvent> = serde_json::from_str(script).expect("script parses");
    for event in events {
        session.handle_event(event, &M);
    }

    let element = session.scene().element(0).expect("image kept");
    assert_eq!(element.position(), Point::new(450.0, 620.0));
    assert_eq!(session.interaction(), &Interaction::Selected { index: 0 });
}
