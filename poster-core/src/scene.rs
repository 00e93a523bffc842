//! Scene model - the ordered element sequence, selection, and background.

use std::sync::Arc;

use crate::element::{Bitmap, Element, TextElement};
use crate::error::{PosterError, PosterResult};
use crate::geometry::{Point, TextMeasurer};

/// The poster scene: elements in paint order plus selection and background.
///
/// Element references are indexes into the sequence; later elements paint
/// over earlier ones. The selection invariant is that `selected_index` is
/// always `None` or a valid index, re-established by every removal. The
/// background is owned here rather than living in any global scope, so its
/// lifecycle is the scene's lifecycle.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    elements: Vec<Element>,
    selected: Option<usize>,
    background: Option<Arc<Bitmap>>,
}

impl Scene {
    /// Create a new empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All elements in paint order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// The element at `index`, if in bounds.
    #[must_use]
    pub fn element(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    /// Number of elements in the scene.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Whether the scene holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Index of the selected element, if any.
    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// The selected element, if any.
    #[must_use]
    pub fn selected_element(&self) -> Option<&Element> {
        self.selected.and_then(|index| self.elements.get(index))
    }

    /// The selected element when it is text.
    #[must_use]
    pub fn selected_text(&self) -> Option<&TextElement> {
        self.selected_element().and_then(Element::as_text)
    }

    /// The background bitmap, if one is loaded.
    #[must_use]
    pub fn background(&self) -> Option<&Arc<Bitmap>> {
        self.background.as_ref()
    }

    /// Append an element, returning its index. Append order is z-order.
    pub fn add_element(&mut self, element: Element) -> usize {
        self.elements.push(element);
        let index = self.elements.len() - 1;
        tracing::debug!("Added element at index {index}");
        index
    }

    /// Replace the element at `index` with a new value.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds.
    pub fn replace_element(&mut self, index: usize, element: Element) -> PosterResult<()> {
        let len = self.elements.len();
        match self.elements.get_mut(index) {
            Some(slot) => {
                *slot = element;
                Ok(())
            }
            None => Err(PosterError::IndexOutOfBounds { index, len }),
        }
    }

    /// Remove the element at `index`, returning it.
    ///
    /// Selection is revalidated: removing the selected element clears the
    /// selection, removing an earlier element shifts it down.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds.
    pub fn remove_element(&mut self, index: usize) -> PosterResult<Element> {
        let len = self.elements.len();
        if index >= len {
            return Err(PosterError::IndexOutOfBounds { index, len });
        }
        let removed = self.elements.remove(index);
        self.selected = match self.selected {
            Some(selected) if selected == index => None,
            Some(selected) if selected > index => Some(selected - 1),
            other => other,
        };
        tracing::debug!("Removed element at index {index}");
        Ok(removed)
    }

    /// Remove the selected element, returning it.
    pub fn remove_selected(&mut self) -> Option<Element> {
        let index = self.selected.take()?;
        Some(self.elements.remove(index))
    }

    /// Set the selection. Indexes past the end clear it.
    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index.filter(|&i| i < self.elements.len());
    }

    /// Replace the background bitmap.
    pub fn set_background(&mut self, background: Option<Arc<Bitmap>>) {
        self.background = background;
    }

    /// Drop all elements, the selection, and the background.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.selected = None;
        self.background = None;
        tracing::debug!("Scene cleared");
    }

    /// Index of the topmost element whose bounds contain the point.
    ///
    /// Scans in reverse so later (higher z) elements win. Elements without
    /// bounds are skipped.
    #[must_use]
    pub fn element_at(&self, point: Point, measurer: &dyn TextMeasurer) -> Option<usize> {
        self.elements
            .iter()
            .enumerate()
            .rev()
            .find(|(_, element)| {
                element
                    .bounds(measurer)
                    .is_some_and(|bounds| bounds.contains(point))
            })
            .map(|(index, _)| index)
    }

    /// Index of the topmost text element whose bounds contain the point.
    #[must_use]
    pub fn text_element_at(&self, point: Point, measurer: &dyn TextMeasurer) -> Option<usize> {
        self.elements
            .iter()
            .enumerate()
            .rev()
            .find(|(_, element)| {
                element.is_text()
                    && element
                        .bounds(measurer)
                        .is_some_and(|bounds| bounds.contains(point))
            })
            .map(|(index, _)| index)
    }
}
