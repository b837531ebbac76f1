//! I/O error types
//!
//! Provides a unified error type for the BMP and ICO encoders. Invalid
//! input (wrong color count, icon sizes) and resource limits are kept
//! apart so callers can fall back to another format on the former.

use thiserror::Error;

/// Error type for image encoding.
#[derive(Error, Debug)]
pub enum IoError {
    /// Standard I/O error while streaming encoded bytes
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The palette size does not fit the requested bit depth
    #[error("Invalid number of colors ({colors}) for a {bits}-bit bitmap")]
    UnsupportedColorCount { bits: u16, colors: usize },

    /// The encoded image would exceed the format's size limit
    #[error("Required memory size too large ({0} bytes)")]
    TooLarge(usize),

    /// An icon image is not between 1x1 and 256x256
    #[error("Invalid image dimensions as an icon: image {index} is {width}x{height}")]
    InvalidIconDimensions { index: usize, width: u32, height: u32 },

    /// No image was given to the icon packer
    #[error("No image given")]
    NoImages,

    /// More images than an icon directory can count
    #[error("Too many images given ({0})")]
    TooManyImages(usize),

    /// An error from the core library
    #[error("core error: {0}")]
    Core(#[from] pixkit_core::Error),
}

/// Convenience alias for I/O results.
pub type IoResult<T> = Result<T, IoError>;
