//! Error types for pixkit-color

use thiserror::Error;

/// Errors that can occur during color processing operations
#[derive(Debug, Error)]
pub enum ColorError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] pixkit_core::Error),

    /// Color value that does not fit the image
    #[error("invalid color value: {0}")]
    InvalidColor(String),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Color space code outside the supported set
    #[error("Unsupported color space given ({0})")]
    UnsupportedColorSpace(i32),

    /// Alpha mask mode outside the supported set
    #[error("Unsupported mask mode given ({0})")]
    UnsupportedMaskMode(i32),

    /// Fewer channel images than the color space requires
    #[error(
        "Number of the channels is not enough for {colorspace} color space, \
         {required} channels required but {given} channels given"
    )]
    NotEnoughChannels {
        colorspace: &'static str,
        required: usize,
        given: usize,
    },

    /// Malformed levels option
    #[error("Invalid levels option given")]
    InvalidLevels,

    /// Malformed tone curve option
    #[error("Invalid tone curve option given")]
    InvalidToneCurve,

    /// Tone curve points could not form a spline
    #[error("Failed to close a tone curve")]
    ToneCurveNotClosed,

    /// Correction options contain nothing to apply
    #[error("nothing to do")]
    NothingToDo,
}

/// Result type for color operations
pub type ColorResult<T> = Result<T, ColorError>;
