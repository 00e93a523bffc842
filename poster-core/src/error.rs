//! Error types for poster engine operations.

use thiserror::Error;

/// Result type for poster engine operations.
pub type PosterResult<T> = Result<T, PosterError>;

/// Errors that can occur in scene and session operations.
#[derive(Debug, Error)]
pub enum PosterError {
    /// Element index is outside the current sequence.
    #[error("Element index {index} out of bounds (scene has {len} elements)")]
    IndexOutOfBounds {
        /// The index that was requested.
        index: usize,
        /// Number of elements in the scene at the time.
        len: usize,
    },

    /// A bitmap was constructed with a pixel buffer of the wrong length.
    #[error("Bitmap buffer length {actual} does not match {width}x{height} RGBA ({expected})")]
    BitmapSize {
        /// Declared width in pixels.
        width: u32,
        /// Declared height in pixels.
        height: u32,
        /// Expected buffer length.
        expected: usize,
        /// Actual buffer length.
        actual: usize,
    },

    /// QR manifest serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
