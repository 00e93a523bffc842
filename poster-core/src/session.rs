//! Interaction state machine for the poster editor.
//!
//! Translates pointer events into selection, drag, and resize operations
//! against the scene, computes the hover cursor, and keeps the floating text
//! toolbar anchored on screen. Everything here is synchronous: a pointer
//! event fully resolves before the next one is processed, and every mutation
//! flags the session for one full redraw of the working surface.

use crate::config::EngineConfig;
use crate::element::{Element, ImageElement, TextElement};
use crate::event::{CursorHint, InputEvent};
use crate::geometry::{handle_at, point_on_selection_border, Corner, Point, TextMeasurer};
use crate::scene::Scene;

/// What the pointer is currently doing.
///
/// A single tagged state makes contradictory combinations (dragging while
/// resizing, editing while resizing) unrepresentable. The index inside each
/// variant always matches the scene's selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// Nothing selected.
    Idle,
    /// An element is selected; the pointer is free.
    Selected {
        /// Index of the selected element.
        index: usize,
    },
    /// The selected element follows the pointer.
    Dragging {
        /// Index of the dragged element.
        index: usize,
        /// Grab offset: pointer position minus element position at grab
        /// time, kept constant so the grip never slides.
        offset: Point,
    },
    /// A corner handle of the selected element is being dragged.
    Resizing {
        /// Index of the resized element.
        index: usize,
        /// The corner being dragged.
        corner: Corner,
    },
    /// A text element's content is being edited.
    EditingText {
        /// Index of the edited element.
        index: usize,
        /// Pending content, committed or discarded as a whole.
        buffer: String,
    },
}

/// Mapping from logical canvas units to the display.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewMetrics {
    /// Canvas top-left corner in screen coordinates.
    pub origin: Point,
    /// Display pixels per logical unit.
    pub scale: f32,
    /// Viewport width in screen pixels, for toolbar clamping.
    pub viewport_width: f32,
}

impl Default for ViewMetrics {
    fn default() -> Self {
        Self {
            origin: Point::new(0.0, 0.0),
            scale: 1.0,
            viewport_width: 800.0,
        }
    }
}

/// Screen position of the floating text toolbar's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolbarAnchor {
    /// Clamped screen x.
    pub x: f32,
    /// Clamped screen y.
    pub y: f32,
}

/// The editing session: scene, interaction state, cursor, and toolbar.
///
/// The session is the single writer of its scene. Embedders feed it pointer
/// events in logical coordinates, apply decoded assets from ingestion, and
/// read back the scene for rendering. After any batch of calls,
/// [`EditorSession::take_redraw_request`] tells the embedder whether the
/// working surface needs repainting.
#[derive(Debug)]
pub struct EditorSession {
    scene: Scene,
    interaction: Interaction,
    cursor: CursorHint,
    toolbar: Option<ToolbarAnchor>,
    view: ViewMetrics,
    config: EngineConfig,
    redraw_requested: bool,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl EditorSession {
    /// Create a session with an empty scene.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            scene: Scene::new(),
            interaction: Interaction::Idle,
            cursor: CursorHint::default(),
            toolbar: None,
            view: ViewMetrics::default(),
            config,
            redraw_requested: true,
        }
    }

    /// The scene being edited.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The current interaction state.
    #[must_use]
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The cursor affordance from the last pointer move.
    #[must_use]
    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    /// Screen anchor of the floating text toolbar, when visible.
    ///
    /// `Some` exactly while the selection is a text element.
    #[must_use]
    pub fn toolbar_anchor(&self) -> Option<ToolbarAnchor> {
        self.toolbar
    }

    /// Whether the working surface needs repainting, clearing the flag.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Update the canvas-to-screen mapping and re-anchor the toolbar.
    pub fn set_view_metrics(&mut self, view: ViewMetrics) {
        self.view = view;
        self.refresh_toolbar();
    }

    /// Dispatch one input event.
    pub fn handle_event(&mut self, event: InputEvent, measurer: &dyn TextMeasurer) {
        match event {
            InputEvent::PointerDown { position } => self.pointer_down(position, measurer),
            InputEvent::PointerMove { position } => self.pointer_move(position, measurer),
            InputEvent::PointerUp => self.pointer_up(),
            InputEvent::DoubleClick { position } => self.double_click(position, measurer),
        }
    }

    /// Resolve a pointer press.
    ///
    /// Priority: resize handles of the selection, then a topmost-first hit
    /// scan (images drag immediately, text drags only from the border band
    /// of an already-selected element), then the border ring of selected
    /// text that the bounds scan missed, then deselection. Any active text
    /// edit commits first, as the press steals focus from the edit buffer.
    pub fn pointer_down(&mut self, point: Point, measurer: &dyn TextMeasurer) {
        if matches!(self.interaction, Interaction::EditingText { .. }) {
            self.commit_text_edit();
        }

        if let Some(index) = self.scene.selected_index() {
            let corner = self
                .scene
                .element(index)
                .and_then(|element| element.bounds(measurer))
                .and_then(|bounds| handle_at(&bounds, point, self.config.handle_size));
            if let Some(corner) = corner {
                self.interaction = Interaction::Resizing { index, corner };
                tracing::debug!("Resize started on element {index} at {corner:?}");
                return;
            }
        }

        let selected = self.scene.selected_index();
        let band = self.config.border_band;
        let inset = self.config.border_core_inset;

        // Topmost-first scan: (index, draggable, grab position).
        let mut hit: Option<(usize, bool, Point)> = None;
        for (index, element) in self.scene.elements().iter().enumerate().rev() {
            let Some(bounds) = element.bounds(measurer) else {
                continue;
            };
            if !bounds.contains(point) {
                continue;
            }
            let draggable = match element {
                Element::Image(_) => true,
                Element::Text(_) => {
                    selected == Some(index)
                        && point_on_selection_border(point, &bounds, band, inset)
                }
            };
            hit = Some((index, draggable, element.position()));
            break;
        }

        // The border band of selected text extends past its bounds, so a
        // miss in the scan can still be a border grab.
        if hit.is_none() {
            if let Some(index) = selected {
                if let Some(element) = self.scene.element(index) {
                    if element.is_text() {
                        let on_border = element
                            .bounds(measurer)
                            .is_some_and(|bounds| {
                                point_on_selection_border(point, &bounds, band, inset)
                            });
                        if on_border {
                            hit = Some((index, true, element.position()));
                        }
                    }
                }
            }
        }

        match hit {
            Some((index, true, position)) => {
                self.scene.select(Some(index));
                self.interaction = Interaction::Dragging {
                    index,
                    offset: point - position,
                };
                self.request_redraw();
                self.refresh_toolbar();
                tracing::debug!("Drag started on element {index}");
            }
            Some((index, false, _)) => {
                self.select(Some(index));
            }
            None => {
                self.select(None);
            }
        }
    }

    /// Resolve a pointer move: resize, drag, or hover.
    pub fn pointer_move(&mut self, point: Point, measurer: &dyn TextMeasurer) {
        match self.interaction {
            Interaction::Resizing { index, corner } => {
                self.apply_resize(index, corner, point, measurer);
            }
            Interaction::Dragging { index, offset } => self.apply_drag(index, offset, point),
            _ => {}
        }
        self.update_cursor(point, measurer);
    }

    /// Release the pointer: any drag or resize settles back to selected.
    pub fn pointer_up(&mut self) {
        if let Interaction::Dragging { index, .. } | Interaction::Resizing { index, .. } =
            self.interaction
        {
            self.interaction = Interaction::Selected { index };
        }
    }

    /// Begin editing the topmost text element under the point, if any.
    pub fn double_click(&mut self, point: Point, measurer: &dyn TextMeasurer) {
        let target = self.scene.text_element_at(point, measurer).and_then(|index| {
            self.scene
                .element(index)
                .and_then(Element::as_text)
                .map(|text| (index, text.content.clone()))
        });
        if let Some((index, buffer)) = target {
            self.scene.select(Some(index));
            self.interaction = Interaction::EditingText { index, buffer };
            self.request_redraw();
            self.refresh_toolbar();
            tracing::debug!("Editing text element {index}");
        }
    }

    /// Set the selection directly. Out-of-range indexes clear it.
    pub fn select(&mut self, index: Option<usize>) {
        self.scene.select(index);
        self.interaction = match self.scene.selected_index() {
            Some(index) => Interaction::Selected { index },
            None => Interaction::Idle,
        };
        self.request_redraw();
        self.refresh_toolbar();
    }

    /// The pending edit buffer, while a text edit is active.
    #[must_use]
    pub fn edit_buffer(&self) -> Option<&str> {
        match &self.interaction {
            Interaction::EditingText { buffer, .. } => Some(buffer),
            _ => None,
        }
    }

    /// Replace the pending edit buffer, if a text edit is active.
    pub fn set_edit_buffer(&mut self, text: impl Into<String>) {
        if let Interaction::EditingText { buffer, .. } = &mut self.interaction {
            *buffer = text.into();
        }
    }

    /// Commit the edit buffer into the element and finish editing.
    pub fn commit_text_edit(&mut self) {
        let Interaction::EditingText { index, buffer } = &self.interaction else {
            return;
        };
        let (index, content) = (*index, buffer.clone());
        if let Some(Element::Text(text)) = self.scene.element(index) {
            let mut text = text.clone();
            text.content = content;
            self.commit_element(index, Element::Text(text));
        }
        self.interaction = Interaction::Selected { index };
    }

    /// Discard the edit buffer without touching the scene.
    pub fn cancel_text_edit(&mut self) {
        if let Interaction::EditingText { index, .. } = self.interaction {
            self.interaction = Interaction::Selected { index };
        }
    }

    /// Append a text element and select it. Font size is clamped.
    pub fn add_text(&mut self, mut text: TextElement) -> usize {
        text.font_size = text
            .font_size
            .clamp(self.config.min_font_size, self.config.max_font_size);
        let index = self.scene.add_element(Element::Text(text));
        self.scene.select(Some(index));
        self.interaction = Interaction::Selected { index };
        self.request_redraw();
        self.refresh_toolbar();
        tracing::debug!("Added text element {index}");
        index
    }

    /// Append a text element with the editor defaults and select it.
    pub fn add_default_text(&mut self) -> usize {
        let text = self.config.default_text_element();
        self.add_text(text)
    }

    /// Append a decoded image element without changing the selection.
    ///
    /// Display dimensions are clamped to the engine minimum. Used by asset
    /// ingestion completions and uploads.
    pub fn insert_image(&mut self, mut image: ImageElement) -> usize {
        image.width = image.width.max(self.config.min_image_dim);
        image.height = image.height.max(self.config.min_image_dim);
        let index = self.scene.add_element(Element::Image(image));
        self.request_redraw();
        index
    }

    /// Replace the scene background and repaint.
    pub fn set_background(&mut self, bitmap: Option<std::sync::Arc<crate::element::Bitmap>>) {
        self.scene.set_background(bitmap);
        self.request_redraw();
    }

    /// Replace the selected text element's content.
    pub fn set_text_content(&mut self, content: impl Into<String>) {
        let content = content.into();
        self.mutate_selected_text(|text| text.content = content);
    }

    /// Change the selected text element's font family.
    pub fn set_font_family(&mut self, family: impl Into<String>) {
        let family = family.into();
        self.mutate_selected_text(|text| text.font_family = family);
    }

    /// Set the selected text element's font size, clamped.
    pub fn set_font_size(&mut self, size: f32) {
        let clamped = size.clamp(self.config.min_font_size, self.config.max_font_size);
        self.mutate_selected_text(|text| text.font_size = clamped);
    }

    /// Bump the selected text element's font size up one step.
    pub fn increase_font_size(&mut self) {
        let step = self.config.font_size_step;
        let max = self.config.max_font_size;
        self.mutate_selected_text(|text| text.font_size = (text.font_size + step).min(max));
    }

    /// Bump the selected text element's font size down one step.
    pub fn decrease_font_size(&mut self) {
        let step = self.config.font_size_step;
        let min = self.config.min_font_size;
        self.mutate_selected_text(|text| text.font_size = (text.font_size - step).max(min));
    }

    /// Change the selected text element's alignment.
    pub fn set_text_align(&mut self, align: crate::element::TextAlign) {
        self.mutate_selected_text(|text| text.align = align);
    }

    /// Change the selected text element's color.
    pub fn set_text_color(&mut self, color: impl Into<String>) {
        let color = color.into();
        self.mutate_selected_text(|text| text.color = color);
    }

    /// Remove the selected element, if any.
    pub fn delete_selected(&mut self) {
        if self.scene.remove_selected().is_some() {
            self.interaction = Interaction::Idle;
            self.request_redraw();
            self.refresh_toolbar();
            tracing::debug!("Deleted selected element");
        }
    }

    /// Drop every element, the selection, and the background.
    ///
    /// Callers running an asset loader should invalidate its pending
    /// requests in the same breath, so decodes issued before the clear
    /// cannot land afterwards.
    pub fn clear(&mut self) {
        self.scene.clear();
        self.interaction = Interaction::Idle;
        self.cursor = CursorHint::default();
        self.toolbar = None;
        self.request_redraw();
    }

    fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    /// Swap in a new value for an element and repaint.
    fn commit_element(&mut self, index: usize, element: Element) {
        if self.scene.replace_element(index, element).is_err() {
            tracing::warn!("Dropped update for stale element index {index}");
            return;
        }
        self.request_redraw();
        self.refresh_toolbar();
    }

    fn mutate_selected_text<F: FnOnce(&mut TextElement)>(&mut self, mutate: F) {
        let Some(index) = self.scene.selected_index() else {
            return;
        };
        let Some(text) = self.scene.element(index).and_then(Element::as_text) else {
            return;
        };
        let mut text = text.clone();
        mutate(&mut text);
        self.commit_element(index, Element::Text(text));
    }

    fn apply_drag(&mut self, index: usize, offset: Point, point: Point) {
        let Some(element) = self.scene.element(index) else {
            return;
        };
        let mut element = element.clone();
        element.set_position(point - offset);
        self.commit_element(index, element);
    }

    fn apply_resize(
        &mut self,
        index: usize,
        corner: Corner,
        point: Point,
        measurer: &dyn TextMeasurer,
    ) {
        let Some(element) = self.scene.element(index) else {
            return;
        };
        let Some(bounds) = element.bounds(measurer) else {
            return;
        };
        match element {
            Element::Image(image) => {
                let min = self.config.min_image_dim;
                let mut image = image.clone();
                match corner {
                    Corner::Se => {
                        image.width = (point.x - bounds.x).max(min);
                        image.height = (point.y - bounds.y).max(min);
                    }
                    Corner::Sw => {
                        image.width = (bounds.right() - point.x).max(min);
                        image.height = (point.y - bounds.y).max(min);
                        image.position.x = point.x;
                    }
                    Corner::Ne => {
                        image.width = (point.x - bounds.x).max(min);
                        image.height = (bounds.bottom() - point.y).max(min);
                        image.position.y = point.y;
                    }
                    Corner::Nw => {
                        image.width = (bounds.right() - point.x).max(min);
                        image.height = (bounds.bottom() - point.y).max(min);
                        image.position.x = point.x;
                        image.position.y = point.y;
                    }
                }
                self.commit_element(index, Element::Image(image));
            }
            Element::Text(text) => {
                // Only the se handle resizes text: both scales relative to
                // the original bounds, averaged into one font-size factor.
                if corner != Corner::Se {
                    return;
                }
                let scale_x = ((point.x - bounds.x) / bounds.width).max(0.5);
                let scale_y = ((point.y - bounds.y) / bounds.height).max(0.5);
                let average = (scale_x + scale_y) / 2.0;
                let mut text = text.clone();
                text.font_size = (text.font_size * average)
                    .clamp(self.config.min_font_size, self.config.max_font_size);
                self.commit_element(index, Element::Text(text));
            }
        }
    }

    /// Recompute the hover cursor. Affordances only show for the selection.
    fn update_cursor(&mut self, point: Point, measurer: &dyn TextMeasurer) {
        self.cursor = self
            .scene
            .selected_index()
            .and_then(|index| self.cursor_for(index, point, measurer))
            .unwrap_or_default();
    }

    fn cursor_for(
        &self,
        index: usize,
        point: Point,
        measurer: &dyn TextMeasurer,
    ) -> Option<CursorHint> {
        let element = self.scene.element(index)?;
        let bounds = element.bounds(measurer)?;
        if let Some(corner) = handle_at(&bounds, point, self.config.handle_size) {
            return Some(match corner {
                Corner::Nw | Corner::Se => CursorHint::ResizeNwSe,
                Corner::Ne | Corner::Sw => CursorHint::ResizeNeSw,
            });
        }
        let hint = match element {
            Element::Text(_) => {
                if point_on_selection_border(
                    point,
                    &bounds,
                    self.config.border_band,
                    self.config.border_core_inset,
                ) {
                    CursorHint::Move
                } else if bounds.contains(point) {
                    CursorHint::Text
                } else {
                    CursorHint::Default
                }
            }
            Element::Image(_) => {
                if bounds.contains(point) {
                    CursorHint::Move
                } else {
                    CursorHint::Default
                }
            }
        };
        Some(hint)
    }

    /// Re-anchor the floating toolbar next to the selected text element.
    ///
    /// Runs synchronously inside every mutation that can move the text, so
    /// the anchor never lags a frame behind the scene.
    fn refresh_toolbar(&mut self) {
        let view = self.view;
        let offset_x = self.config.toolbar_offset_x;
        let margin = self.config.toolbar_margin;
        let width = self.config.toolbar_width;
        self.toolbar = self.scene.selected_text().map(|text| {
            let raw_x = view.origin.x + (text.position.x + offset_x) * view.scale;
            let raw_y = view.origin.y + (text.position.y - text.font_size) * view.scale;
            ToolbarAnchor {
                x: raw_x.min(view.viewport_width - width).max(margin),
                y: raw_y.max(margin),
            }
        });
    }
}
