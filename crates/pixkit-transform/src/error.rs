//! Error types for pixkit-transform

use thiserror::Error;

/// Errors that can occur during geometric transformations
#[derive(Debug, Error)]
pub enum TransformError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] pixkit_core::Error),

    /// Color library error
    #[error("color error: {0}")]
    Color(#[from] pixkit_color::ColorError),

    /// Requested output size is zero or too large
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },

    /// Unknown flip or scale mode value
    #[error("unsupported mode given ({0})")]
    UnsupportedMode(i32),

    /// Invalid transformation parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The seam carver failed to produce an image
    #[error("seam carving failed: {0}")]
    Carve(String),
}

/// Result type for transform operations
pub type TransformResult<T> = Result<T, TransformError>;
