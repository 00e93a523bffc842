//! # Poster Core
//!
//! Scene model and interaction logic for the poster composition engine.
//! Pure and synchronous: no rasterisation, no I/O, no async. Embedders feed
//! pointer events in and read the scene back out for rendering.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 poster-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Scene Model     │  Geometry                │
//! │  - Text/images   │  - Bounds, handles       │
//! │  - Z-order       │  - Border band           │
//! │  - Background    │  - Hit-testing           │
//! ├─────────────────────────────────────────────┤
//! │  Editor Session  │  Configuration           │
//! │  - Drag/resize   │  - Canvas geometry       │
//! │  - Text editing  │  - Defaults, clamps      │
//! │  - Toolbar/cursor│  - Export scale          │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod element;
pub mod error;
pub mod event;
pub mod geometry;
pub mod scene;
pub mod session;

pub use config::{EngineConfig, FONT_FAMILIES, FONT_SIZE_PRESETS};
pub use element::{
    Bitmap, Element, ImageElement, QrCodeSource, QrMetadata, TextAlign, TextElement,
};
pub use error::{PosterError, PosterResult};
pub use event::{CursorHint, InputEvent};
pub use geometry::{
    handle_at, point_on_selection_border, resize_handles, Corner, FixedAdvanceMeasurer, HandleBox,
    Point, Rect, TextMeasurer,
};
pub use scene::Scene;
pub use session::{EditorSession, Interaction, ToolbarAnchor, ViewMetrics};

/// Poster core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
