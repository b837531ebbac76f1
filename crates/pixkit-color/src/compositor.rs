//! Channel compositing
//!
//! Splits images into per-channel gray images, builds truecolor images
//! back from channel images, and applies gray images as alpha masks.
//!
//! Channel images are indexed images over the 256-level black-to-white
//! gray palette, so a pixel's index is its channel value. Any image can be
//! used as a channel source though; see [`Channel`] for how other layouts
//! are read.
//!
//! # Channel order
//!
//! Color channels come first in the order the color space names them
//! (R, G, B / H, S, V / H, S, L / C, M, Y, K). When alpha is included it is
//! always the last channel.

use crate::channel::Channel;
use crate::colorspace::{
    Cmyk, ColorSpace, ColorSpaceFlags, Hsl, Hsv, cmyk_to_rgb, hsl_to_rgb, hsv_to_rgb, rgb_to_cmyk,
    rgb_to_hsl, rgb_to_hsv,
};
use crate::error::{ColorError, ColorResult};
use pixkit_core::color::{self, ALPHA_TRANSPARENT, MAX_ALPHA, alpha_to_gray, float_to_byte};
use pixkit_core::{Anchor, Palette, Pix, PixMut, Position};
use tracing::debug;

// ============================================================================
// Options
// ============================================================================

/// Placement of channel images of differing sizes in [`merge`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeOptions {
    /// Where smaller channels sit on the canvas
    pub position: Position,
    /// Use the smallest channel extent instead of the largest
    pub crop: bool,
}

impl MergeOptions {
    /// Flag selecting the smallest extent
    pub const CROP: i32 = 0x10;

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_crop(mut self, crop: bool) -> Self {
        self.crop = crop;
        self
    }

    /// Decode position flags optionally combined with [`MergeOptions::CROP`].
    pub fn from_bits(bits: i32) -> Self {
        Self {
            position: Position::from_bits(bits),
            crop: bits & Self::CROP != 0,
        }
    }
}

/// How a mask's alpha combines with the target's alpha
///
/// Alpha values run from 0 (opaque) to 127 (transparent), so `And`
/// combines with a bitwise OR and `Or` with a bitwise AND: the result is
/// as opaque as both inputs, or as either input, respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MaskMode {
    /// Replace the target alpha
    #[default]
    Set,
    /// Multiply opacities
    Merge,
    /// Screen opacities
    Screen,
    And,
    Or,
    Xor,
}

impl MaskMode {
    pub const SET: i32 = 0;
    pub const MERGE: i32 = 1;
    pub const SCREEN: i32 = 2;
    pub const AND: i32 = 3;
    pub const OR: i32 = 4;
    pub const XOR: i32 = 5;
    /// Flag: negate the combined alpha
    pub const NOT: i32 = 0x08;
    /// Flag: repeat the mask across the target
    pub const TILE: i32 = 0x10;

    /// Combine mask alpha `mask` with the current alpha `current`.
    pub fn combine(self, mask: u8, current: u8) -> u8 {
        let max = MAX_ALPHA as i32;
        let (a1, a2) = (mask as i32, current as i32);
        let v = match self {
            MaskMode::Set => a1,
            MaskMode::Merge => {
                let a0 = max - a1;
                max - (a0 * a0 + (max - a2) * a1) / max
            }
            MaskMode::Screen => max - ((max - a1) + (max - a2) * a1 / max),
            MaskMode::And => a2 | a1,
            MaskMode::Or => a2 & a1,
            MaskMode::Xor => a2 ^ a1,
        };
        v.clamp(0, max) as u8
    }
}

impl TryFrom<i32> for MaskMode {
    type Error = ColorError;

    fn try_from(bits: i32) -> ColorResult<Self> {
        match bits {
            Self::SET => Ok(MaskMode::Set),
            Self::MERGE => Ok(MaskMode::Merge),
            Self::SCREEN => Ok(MaskMode::Screen),
            Self::AND => Ok(MaskMode::And),
            Self::OR => Ok(MaskMode::Or),
            Self::XOR => Ok(MaskMode::Xor),
            _ => Err(ColorError::UnsupportedMaskMode(bits)),
        }
    }
}

/// Options for [`alpha_mask`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaskOptions {
    /// Invert the combined alpha
    pub negate: bool,
    /// Repeat the mask to cover the whole target
    pub tile: bool,
    /// Placement of the mask, or of the tiling origin
    pub position: Position,
    /// Read the mask's intensities as alpha values directly
    pub raw_alpha: bool,
}

impl MaskOptions {
    pub fn with_negate(mut self, negate: bool) -> Self {
        self.negate = negate;
        self
    }

    pub fn with_tile(mut self, tile: bool) -> Self {
        self.tile = tile;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_raw_alpha(mut self, raw: bool) -> Self {
        self.raw_alpha = raw;
        self
    }

    /// Decode a mode word carrying [`MaskMode::NOT`], [`MaskMode::TILE`]
    /// and the raw alpha flags, plus position flags.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::UnsupportedMaskMode`] when the remaining bits
    /// name no mode.
    pub fn from_bits(mode: i32, position: i32) -> ColorResult<(MaskMode, Self)> {
        let flags = MaskMode::NOT | MaskMode::TILE | ColorSpace::RAW_ALPHA;
        let kind =
            MaskMode::try_from(mode & !flags).map_err(|_| ColorError::UnsupportedMaskMode(mode))?;
        let options = Self {
            negate: mode & MaskMode::NOT != 0,
            tile: mode & MaskMode::TILE != 0,
            position: Position::from_bits(position),
            raw_alpha: mode & ColorSpace::RAW_ALPHA != 0,
        };
        Ok((kind, options))
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// Blank channel image with the ascending 256-level gray palette.
fn gray_plane(width: u32, height: u32) -> ColorResult<PixMut> {
    let pal = Palette::linear_gray(256, true)?;
    Ok(PixMut::new_indexed(width, height, pal)?)
}

/// Split an RGB triple into the color channels of `space`.
fn split(space: ColorSpace, r: u8, g: u8, b: u8) -> [u8; 4] {
    match space {
        ColorSpace::Rgb => [r, g, b, 0],
        ColorSpace::Hsv => {
            let Hsv { h, s, v } = rgb_to_hsv(r, g, b);
            [float_to_byte(h), float_to_byte(s), float_to_byte(v), 0]
        }
        ColorSpace::Hsl => {
            let Hsl { h, s, l } = rgb_to_hsl(r, g, b);
            [float_to_byte(h), float_to_byte(s), float_to_byte(l), 0]
        }
        ColorSpace::Cmyk => {
            let Cmyk { c, m, y, k } = rgb_to_cmyk(r, g, b);
            [
                float_to_byte(c),
                float_to_byte(m),
                float_to_byte(y),
                float_to_byte(k),
            ]
        }
    }
}

/// Split an image into gray channel images.
///
/// Returns one image per color channel of `flags.space`, followed by an
/// alpha image when `flags.alpha` is set. The alpha image holds opacity
/// (255 opaque, 0 transparent) or, with `flags.raw_alpha`, the 7-bit alpha
/// values themselves. An indexed image's transparent index counts as
/// fully transparent.
///
/// # Errors
///
/// Fails only if the channel images cannot be allocated.
pub fn extract(pix: &Pix, flags: impl Into<ColorSpaceFlags>) -> ColorResult<Vec<Pix>> {
    let flags = flags.into();
    let (width, height) = (pix.width(), pix.height());
    let n = flags.space.arity();
    let mut planes = (0..flags.channel_count())
        .map(|_| gray_plane(width, height))
        .collect::<ColorResult<Vec<_>>>()?;
    let transparent = pix.palette().and_then(|pal| pal.transparent());

    for y in 0..height {
        for x in 0..width {
            let (r, g, b, a, clear) = match pix.palette() {
                None => {
                    let (r, g, b, a) = color::extract_argb(pix.get_argb_unchecked(x, y));
                    (r, g, b, a, false)
                }
                Some(pal) => {
                    let i = pix.get_index_unchecked(x, y);
                    let e = pal.get(i).copied().unwrap_or_default();
                    (e.red, e.green, e.blue, e.alpha, transparent == Some(i))
                }
            };
            let values = split(flags.space, r, g, b);
            for (plane, v) in planes.iter_mut().zip(&values[..n]) {
                plane.set_index_unchecked(x, y, *v);
            }
            if flags.alpha {
                let v = match (clear, flags.raw_alpha) {
                    (true, true) => ALPHA_TRANSPARENT,
                    (true, false) => 0,
                    (false, true) => a,
                    (false, false) => alpha_to_gray(a),
                };
                planes[n].set_index_unchecked(x, y, v);
            }
        }
    }

    Ok(planes.into_iter().map(Pix::from).collect())
}

// ============================================================================
// Merging
// ============================================================================

/// Sampler for one merge input, offset when its size differs from the canvas.
fn place<'p>(p: Option<&'p Pix>, width: u32, height: u32, options: &MergeOptions) -> Channel<'p> {
    let (pw, ph) = p.map_or((0, 0), |p| (p.width(), p.height()));
    let x = if pw != width {
        options.position.x_offset(width as i32, pw as i32)
    } else {
        0
    };
    let y = if ph != height {
        options.position.y_offset(height as i32, ph as i32)
    } else {
        0
    };
    Channel::new(p, x, y)
}

/// Build a truecolor image from channel images.
///
/// The first `flags.space.arity()` images are the color channels; when
/// `flags.alpha` is set the last image supplies the alpha channel. Extra
/// images in between are ignored.
///
/// The canvas starts at the alpha image's size and grows to the largest
/// channel extent, or shrinks to the smallest with `options.crop`. Images
/// of a different size are placed by `options.position`. Color samples
/// outside a channel read as 0 and alpha samples as transparent; without
/// an alpha channel the result is opaque.
///
/// # Errors
///
/// Returns [`ColorError::NotEnoughChannels`] if fewer images are given
/// than the color space needs.
pub fn merge(
    channels: &[Pix],
    flags: impl Into<ColorSpaceFlags>,
    options: &MergeOptions,
) -> ColorResult<Pix> {
    let flags = flags.into();
    let required = flags.channel_count();
    if channels.len() < required {
        return Err(ColorError::NotEnoughChannels {
            colorspace: flags.name(),
            required,
            given: channels.len(),
        });
    }
    let n = flags.space.arity();
    let colors = &channels[..n];
    let alpha = if flags.alpha { channels.last() } else { None };

    let (mut width, mut height) = alpha.map_or((0, 0), |p| (p.width(), p.height()));
    for p in colors {
        if options.crop {
            if width == 0 || width > p.width() {
                width = p.width();
            }
            if height == 0 || height > p.height() {
                height = p.height();
            }
        } else {
            width = width.max(p.width());
            height = height.max(p.height());
        }
    }
    debug!(width, height, crop = options.crop, "merge canvas");

    let color_ch: Vec<Channel> = colors
        .iter()
        .map(|p| place(Some(p), width, height, options))
        .collect();
    let alpha_ch = place(alpha, width, height, options);

    let mut out = PixMut::new_truecolor(width, height)?;
    for y in 0..height {
        for x in 0..width {
            let (xi, yi) = (x as i32, y as i32);
            let mut v = [0u8; 4];
            for (slot, ch) in v.iter_mut().zip(&color_ch) {
                *slot = ch.sample_intensity(xi, yi, 0);
            }
            let unit = |i: usize| v[i] as f32 / 255.0;
            let (r, g, b) = match flags.space {
                ColorSpace::Rgb => (v[0], v[1], v[2]),
                ColorSpace::Hsv => hsv_to_rgb(Hsv::new(unit(0), unit(1), unit(2))),
                ColorSpace::Hsl => hsl_to_rgb(Hsl::new(unit(0), unit(1), unit(2))),
                ColorSpace::Cmyk => cmyk_to_rgb(Cmyk::new(unit(0), unit(1), unit(2), unit(3))),
            };
            let a = alpha_ch.sample_alpha(xi, yi, ALPHA_TRANSPARENT, flags.raw_alpha);
            out.set_argb_unchecked(x, y, color::compose_argb(r, g, b, a));
        }
    }
    out.set_save_alpha(flags.alpha);
    Ok(out.into())
}

// ============================================================================
// Alpha masking
// ============================================================================

/// Tiling origin along one axis: where the tile covering coordinate 0
/// starts. Targets no larger than the mask keep the placed offset.
fn tile_origin(target: u32, length: u32, placed: i32, anchor: Anchor) -> i32 {
    if target <= length {
        return placed;
    }
    let (t, l) = (target as i32, length as i32);
    match anchor {
        Anchor::Head => 0,
        Anchor::Body => (t % l) / 2 - l,
        Anchor::Tail => t % l - l,
    }
}

/// Apply a gray image to the alpha channel of `target`.
///
/// `target` is converted to truecolor and marked to save alpha. Each
/// pixel's alpha becomes `mode.combine(mask, current)`, negated when
/// `options.negate` is set. The mask is read through [`Channel`] as alpha
/// (white opaque, or raw values with `options.raw_alpha`); target pixels
/// outside the mask see a transparent mask.
///
/// With `options.tile` the mask repeats in both directions. When the
/// target is larger than the mask along an axis, the position decides
/// where the partial tiles go: left/top starts a whole tile at 0,
/// right/bottom ends one at the far edge and center/middle splits the
/// remainder evenly.
pub fn alpha_mask(
    target: &mut PixMut,
    mask: &Pix,
    mode: MaskMode,
    options: &MaskOptions,
) -> ColorResult<()> {
    target.convert_to_truecolor();
    target.set_save_alpha(true);

    let (width, height) = (target.width(), target.height());
    let (mw, mh) = (mask.width(), mask.height());
    let position = options.position;
    let x_offset = position.x_offset(width as i32, mw as i32);
    let y_offset = position.y_offset(height as i32, mh as i32);

    let (x0, y0) = if options.tile {
        let x0 = tile_origin(width, mw, x_offset, position.h.into());
        let y0 = tile_origin(height, mh, y_offset, position.v.into());
        debug!(x0, y0, mw, mh, "alpha mask tile origin");
        (x0, y0)
    } else {
        (x_offset, y_offset)
    };
    let ch = Channel::new(Some(mask), 0, 0);
    let mask_alpha = |x: i32, y: i32| {
        let (mx, my) = if options.tile {
            ((x - x0).rem_euclid(mw as i32), (y - y0).rem_euclid(mh as i32))
        } else {
            (x - x0, y - y0)
        };
        ch.sample_alpha(mx, my, ALPHA_TRANSPARENT, options.raw_alpha)
    };

    for y in 0..height {
        for x in 0..width {
            let c = target.get_argb_unchecked(x, y);
            let (r, g, b, current) = color::extract_argb(c);
            let mut a = mode.combine(mask_alpha(x as i32, y as i32), current);
            if options.negate {
                a = MAX_ALPHA & !a;
            }
            target.set_argb_unchecked(x, y, color::compose_argb(r, g, b, a));
        }
    }
    Ok(())
}
