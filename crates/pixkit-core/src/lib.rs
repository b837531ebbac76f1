//! pixkit Core - Pixel buffers and palettes
//!
//! This crate provides the fundamental data structures used throughout
//! the pixkit image toolkit:
//!
//! - [`Pix`] / [`PixMut`] - The image container (immutable / mutable),
//!   holding either palette indices or packed ARGB values
//! - [`Palette`] / [`PaletteEntry`] - Color table for indexed images
//! - [`Position`] - Placement flags and offset math shared by the
//!   compositor and the geometry operations
//! - [`color`] - ARGB packing and the 7-bit alpha helpers

pub mod error;
pub mod palette;
pub mod pix;
pub mod position;

pub use error::{Error, Result};
pub use palette::{GrayRamp, Palette, PaletteEntry};
pub use pix::{ColorMode, Pix, PixMut};
pub use position::{Align, Anchor, Position, VAlign, calc_offset};

/// Color channel helpers for packed 32-bit ARGB pixels.
///
/// # Pixel format
///
/// Truecolor pixels are stored as `0xAARRGGBB` with a 7-bit alpha in the
/// top byte: 0 is fully opaque and 127 fully transparent. Bit 31 is never
/// set in a valid pixel.
pub mod color {
    /// Shift amounts for extracting color channels
    pub const ALPHA_SHIFT: u32 = 24;
    pub const RED_SHIFT: u32 = 16;
    pub const GREEN_SHIFT: u32 = 8;
    pub const BLUE_SHIFT: u32 = 0;

    /// Fully opaque alpha value
    pub const ALPHA_OPAQUE: u8 = 0;
    /// Fully transparent alpha value
    pub const ALPHA_TRANSPARENT: u8 = 127;
    /// Largest alpha value
    pub const MAX_ALPHA: u8 = 127;

    /// Extract the alpha component (0..=127) from a pixel.
    #[inline]
    pub fn alpha(pixel: u32) -> u8 {
        ((pixel >> ALPHA_SHIFT) & 0x7f) as u8
    }

    /// Extract the red component from a pixel.
    #[inline]
    pub fn red(pixel: u32) -> u8 {
        ((pixel >> RED_SHIFT) & 0xff) as u8
    }

    /// Extract the green component from a pixel.
    #[inline]
    pub fn green(pixel: u32) -> u8 {
        ((pixel >> GREEN_SHIFT) & 0xff) as u8
    }

    /// Extract the blue component from a pixel.
    #[inline]
    pub fn blue(pixel: u32) -> u8 {
        ((pixel >> BLUE_SHIFT) & 0xff) as u8
    }

    /// Compose an opaque pixel.
    #[inline]
    pub fn compose_rgb(r: u8, g: u8, b: u8) -> u32 {
        compose_argb(r, g, b, ALPHA_OPAQUE)
    }

    /// Compose a pixel with alpha. Alpha values above 127 are masked.
    #[inline]
    pub fn compose_argb(r: u8, g: u8, b: u8, a: u8) -> u32 {
        (((a & 0x7f) as u32) << ALPHA_SHIFT)
            | ((r as u32) << RED_SHIFT)
            | ((g as u32) << GREEN_SHIFT)
            | ((b as u32) << BLUE_SHIFT)
    }

    /// Extract (r, g, b) from a pixel.
    #[inline]
    pub fn extract_rgb(pixel: u32) -> (u8, u8, u8) {
        (red(pixel), green(pixel), blue(pixel))
    }

    /// Extract (r, g, b, a) from a pixel.
    #[inline]
    pub fn extract_argb(pixel: u32) -> (u8, u8, u8, u8) {
        (red(pixel), green(pixel), blue(pixel), alpha(pixel))
    }

    /// Check that a host-supplied integer is a valid truecolor value.
    #[inline]
    pub fn is_valid_argb(value: i64) -> bool {
        value & 0x7fff_ffff == value
    }

    /// Convert a [0, 1] float to a byte.
    #[inline]
    pub fn float_to_byte(value: f32) -> u8 {
        ((value * 255.5) as i32).clamp(0, 255) as u8
    }

    /// Convert a [0, 1] opacity to a 7-bit alpha (1.0 is opaque).
    #[inline]
    pub fn float_to_alpha(value: f32) -> u8 {
        (((1.0 - value) * 127.5) as i32).clamp(0, MAX_ALPHA as i32) as u8
    }

    /// Convert a 7-bit alpha to an 8-bit gray level (255 is opaque).
    #[inline]
    pub fn alpha_to_gray(a: u8) -> u8 {
        match a {
            0 => 255,
            a if a >= MAX_ALPHA => 0,
            a => 255 - a * 2,
        }
    }

    /// Convert an 8-bit gray level to a 7-bit alpha.
    #[inline]
    pub fn gray_to_alpha(gray: u8) -> u8 {
        MAX_ALPHA - gray / 2
    }

    /// Luma-weighted intensity of an RGB triple.
    #[inline]
    pub fn rgb_to_gray(r: u8, g: u8, b: u8) -> u8 {
        let v = r as f32 * 0.299 + g as f32 * 0.587 + b as f32 * 0.114;
        (v as i32).clamp(0, 255) as u8
    }

    /// Alpha derived from the intensity of an RGB triple.
    #[inline]
    pub fn rgb_to_alpha(r: u8, g: u8, b: u8) -> u8 {
        gray_to_alpha(rgb_to_gray(r, g, b))
    }

    /// Composite `src` over `dst`, both packed ARGB.
    ///
    /// Opaque sources replace, fully transparent sources keep the
    /// destination, and a fully transparent destination takes the source
    /// as is.
    pub fn alpha_blend(dst: u32, src: u32) -> u32 {
        let src_alpha = alpha(src) as i32;
        if src_alpha == ALPHA_OPAQUE as i32 {
            return src;
        }
        let dst_alpha = alpha(dst) as i32;
        if src_alpha == ALPHA_TRANSPARENT as i32 {
            return dst;
        }
        if dst_alpha == ALPHA_TRANSPARENT as i32 {
            return src;
        }
        let max = MAX_ALPHA as i32;
        let src_weight = max - src_alpha;
        let dst_weight = (max - dst_alpha) * src_alpha / max;
        let total = src_weight + dst_weight;
        let mix = |s: u8, d: u8| ((s as i32 * src_weight + d as i32 * dst_weight) / total) as u8;
        compose_argb(
            mix(red(src), red(dst)),
            mix(green(src), green(dst)),
            mix(blue(src), blue(dst)),
            (src_alpha * dst_alpha / max) as u8,
        )
    }

}
