//! # Poster Renderer
//!
//! CPU rasterization and asset ingestion for the poster editor.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 Asset Ingestion                  │
//! │  URL / file / data URI ──► decode ──► completion │
//! ├──────────────────────────────────────────────────┤
//! │                   Compositor                     │
//! │  working surface (decorations)  ·  export surface│
//! ├────────────────────────┬─────────────────────────┤
//! │ Font Catalog           │ Raster Primitives       │
//! │ (fontdb + rusttype)    │ (fills, strokes, blits) │
//! └────────────────────────┴─────────────────────────┘
//! ```
//!
//! The compositor draws the same scene two ways: a working surface at
//! canvas resolution with selection decorations, and a clean export
//! surface at print resolution. Both run entirely on the CPU so the
//! output is identical everywhere.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod compositor;
pub mod error;
pub mod fonts;
pub mod ingest;
pub mod raster;

pub use compositor::{Compositor, ExportBundle};
pub use error::{RenderError, RenderResult};
pub use fonts::FontCatalog;
pub use ingest::{
    apply_outcome, AssetKind, AssetLoader, AssetSource, IngestOutcome, IngestPayload, IngestTicket,
    RequestId,
};

/// Poster renderer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
