//! In-place mirroring
//!
//! Both storage modes keep one `u32` per pixel, so rows and columns are
//! swapped the same way for indexed and truecolor images and the palette
//! is left untouched.

use crate::{TransformError, TransformResult};
use pixkit_core::PixMut;

/// Mirror axis selection
///
/// `Horizontal` mirrors across the horizontal axis, exchanging the top and
/// bottom rows. `Vertical` mirrors across the vertical axis, exchanging the
/// left and right columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlipMode {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

impl FlipMode {
    pub const HORIZONTAL: i32 = 1;
    pub const VERTICAL: i32 = 2;

    /// Whether rows are exchanged.
    pub fn swaps_rows(self) -> bool {
        matches!(self, FlipMode::Horizontal | FlipMode::Both)
    }

    /// Whether columns are exchanged.
    pub fn swaps_columns(self) -> bool {
        matches!(self, FlipMode::Vertical | FlipMode::Both)
    }
}

impl TryFrom<i32> for FlipMode {
    type Error = TransformError;

    fn try_from(bits: i32) -> TransformResult<Self> {
        match bits {
            0 => Ok(FlipMode::None),
            Self::HORIZONTAL => Ok(FlipMode::Horizontal),
            Self::VERTICAL => Ok(FlipMode::Vertical),
            3 => Ok(FlipMode::Both),
            _ => Err(TransformError::UnsupportedMode(bits)),
        }
    }
}

/// Mirror an image in place.
///
/// Rows are exchanged pairwise from the outside in; columns are reversed
/// within each row. A middle row or column stays where it is.
pub fn flip(pix: &mut PixMut, mode: FlipMode) {
    let width = pix.width() as usize;
    let height = pix.height() as usize;
    let data = pix.data_mut();

    if mode.swaps_rows() {
        for y in 0..height / 2 {
            let (top, bottom) = data.split_at_mut((height - 1 - y) * width);
            top[y * width..(y + 1) * width].swap_with_slice(&mut bottom[..width]);
        }
    }

    if mode.swaps_columns() {
        for row in data.chunks_exact_mut(width) {
            row.reverse();
        }
    }
}
