//! Error types for pixkit-core
//!
//! Provides a unified error type for the pixel buffer, palette and
//! placement helpers. Higher crates wrap this type in their own error
//! enums via `#[from]`.

use thiserror::Error;

/// pixkit-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid image dimensions
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Operation requires an indexed image
    #[error("palette required but the image is truecolor")]
    PaletteRequired,

    /// Palette has no room for another entry
    #[error("palette is full ({0} entries)")]
    PaletteFull(usize),

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Pixel coordinate outside the image
    #[error("pixel ({x}, {y}) outside {width}x{height} image")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Buffer would exceed the addressable size
    #[error("image of {width}x{height} is too large")]
    TooLarge { width: u32, height: u32 },
}

/// Result type alias for pixkit-core operations
pub type Result<T> = std::result::Result<T, Error>;
