//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rasterising scenes or ingesting assets.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No usable font face could be resolved for a requested family.
    #[error("Font resolution failed: {0}")]
    Font(String),

    /// Image bytes could not be decoded.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// An asset could not be fetched from its source.
    #[error("Failed to load asset: {0}")]
    Fetch(String),

    /// The poster background could not be loaded.
    #[error("Failed to load poster background image: {0}")]
    Background(String),

    /// Encoding the export surface failed.
    #[error("Export encoding failed: {0}")]
    Encode(String),

    /// Filesystem error while reading an asset.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
