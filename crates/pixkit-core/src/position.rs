//! Placement of one extent inside another
//!
//! Merging channels, masking and scaling all need to place an image of
//! one size onto a canvas of another. A [`Position`] combines a
//! horizontal and a vertical alignment; [`calc_offset`] turns an
//! alignment into a signed offset.
//!
//! Positions round-trip through the integer flag encoding used by callers
//! that pass options as plain numbers: bits 0-1 carry the horizontal
//! alignment (left 0, center 1, right 2) and bits 2-3 the vertical one
//! (top 0, middle 4, bottom 8).

use crate::error::{Error, Result};

/// Horizontal alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Edge of an extent to align against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Head,
    Body,
    Tail,
}

impl From<Align> for Anchor {
    fn from(a: Align) -> Self {
        match a {
            Align::Left => Anchor::Head,
            Align::Center => Anchor::Body,
            Align::Right => Anchor::Tail,
        }
    }
}

impl From<VAlign> for Anchor {
    fn from(a: VAlign) -> Self {
        match a {
            VAlign::Top => Anchor::Head,
            VAlign::Middle => Anchor::Body,
            VAlign::Bottom => Anchor::Tail,
        }
    }
}

/// 2D placement, middle-center by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub h: Align,
    pub v: VAlign,
}

impl Position {
    pub const LEFT: i32 = 0;
    pub const CENTER: i32 = 1;
    pub const RIGHT: i32 = 2;
    pub const TOP: i32 = 0;
    pub const MIDDLE: i32 = 4;
    pub const BOTTOM: i32 = 8;
    /// Bits that carry a position
    pub const MASK: i32 = 0x0f;

    pub fn new(h: Align, v: VAlign) -> Self {
        Self { h, v }
    }

    pub fn top_left() -> Self {
        Self::new(Align::Left, VAlign::Top)
    }

    pub fn bottom_right() -> Self {
        Self::new(Align::Right, VAlign::Bottom)
    }

    /// Decode from integer flags. Bits outside [`Position::MASK`] are
    /// ignored; the unused value 3 in either field falls back to the head
    /// edge.
    pub fn from_bits(bits: i32) -> Self {
        let h = match bits & 0x03 {
            Self::CENTER => Align::Center,
            Self::RIGHT => Align::Right,
            _ => Align::Left,
        };
        let v = match bits & 0x0c {
            Self::MIDDLE => VAlign::Middle,
            Self::BOTTOM => VAlign::Bottom,
            _ => VAlign::Top,
        };
        Self { h, v }
    }

    /// Encode as integer flags.
    pub fn bits(self) -> i32 {
        let h = match self.h {
            Align::Left => Self::LEFT,
            Align::Center => Self::CENTER,
            Align::Right => Self::RIGHT,
        };
        let v = match self.v {
            VAlign::Top => Self::TOP,
            VAlign::Middle => Self::MIDDLE,
            VAlign::Bottom => Self::BOTTOM,
        };
        h | v
    }

    /// Horizontal offset placing `length` within `target`.
    pub fn x_offset(self, target: i32, length: i32) -> i32 {
        calc_offset(target, length, self.h.into())
    }

    /// Vertical offset placing `length` within `target`.
    pub fn y_offset(self, target: i32, length: i32) -> i32 {
        calc_offset(target, length, self.v.into())
    }
}

impl TryFrom<i32> for Position {
    type Error = Error;

    /// Strict decoding that rejects bits outside the position mask.
    fn try_from(bits: i32) -> Result<Self> {
        if bits & !Self::MASK != 0 {
            return Err(Error::InvalidParameter(format!(
                "unknown position flags: {bits:#x}"
            )));
        }
        Ok(Self::from_bits(bits))
    }
}

/// Signed offset that aligns an extent of `length` against `target`.
///
/// Head gives 0, body centers (truncating toward zero) and tail aligns the
/// far edges. Negative results mean the extent overhangs the target.
pub fn calc_offset(target: i32, length: i32, anchor: Anchor) -> i32 {
    match anchor {
        Anchor::Head => 0,
        Anchor::Body => (target - length) / 2,
        Anchor::Tail => target - length,
    }
}
