//! Color space conversion
//!
//! Provides conversion between RGB and the color models used by channel
//! extraction, merging and correction:
//! - RGB <-> HSV (Hue, Saturation, Value)
//! - RGB <-> HSL (Hue, Saturation, Lightness)
//! - RGB <-> CMYK (Cyan, Magenta, Yellow, Key)
//!
//! The byte-oriented functions work in single precision and write bytes
//! back through [`float_to_byte`]. The `*_unit` functions take and return
//! double precision components in [0, 1] and are used for color strings
//! and [`convert`].

use crate::error::{ColorError, ColorResult};
use pixkit_core::color::float_to_byte;

/// HSV color representation
///
/// - `h`: Hue in range [0.0, 1.0) (where 1.0 wraps to 0.0)
/// - `s`: Saturation in range [0.0, 1.0]
/// - `v`: Value in range [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl Hsv {
    /// Create a new HSV color
    pub fn new(h: f32, s: f32, v: f32) -> Self {
        Self { h, s, v }
    }
}

/// HSL color representation
///
/// - `h`: Hue in range [0.0, 1.0)
/// - `s`: Saturation in range [0.0, 1.0]
/// - `l`: Lightness in range [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Hsl {
    /// Create a new HSL color
    pub fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }
}

/// CMYK color representation, all components in [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cmyk {
    pub c: f32,
    pub m: f32,
    pub y: f32,
    pub k: f32,
}

impl Cmyk {
    /// Create a new CMYK color
    pub fn new(c: f32, m: f32, y: f32, k: f32) -> Self {
        Self { c, m, y, k }
    }
}

// ============================================================================
// Single precision (byte in / byte out)
// ============================================================================

/// Largest and smallest of three values.
#[inline]
fn max_min<T: PartialOrd + Copy>(r: T, g: T, b: T) -> (T, T) {
    if r > g {
        if r > b {
            (r, if b > g { g } else { b })
        } else {
            (b, g)
        }
    } else if b > g {
        (b, r)
    } else {
        (g, if r > b { b } else { r })
    }
}

/// Hue in [0, 1) from the six-way max-channel split.
#[inline]
fn hue_f32(r: i32, g: i32, b: i32, mx: i32, d: f32) -> f32 {
    let f = (if mx == r {
        (g - b) as f32 / d
    } else if mx == g {
        2.0 + (b - r) as f32 / d
    } else {
        4.0 + (r - g) as f32 / d
    }) / 6.0;
    if f < 0.0 { f + 1.0 } else { f }
}

/// Convert RGB values to HSV
///
/// Achromatic colors (max == min) report hue and saturation 0.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let (mx, mn) = max_min(r, g, b);
    let v = mx as f32 / 255.0;
    if mx == mn {
        return Hsv::new(0.0, 0.0, v);
    }
    let d = (mx - mn) as f32;
    Hsv::new(hue_f32(r, g, b, mx, d), d / mx as f32, v)
}

/// Convert RGB values to HSL
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> Hsl {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let (mx, mn) = max_min(r, g, b);
    let l = (mx + mn) as f32 / 510.0;
    if mx == mn {
        return Hsl::new(0.0, 0.0, l);
    }
    let d = (mx - mn) as f32;
    let s = if l <= 0.5 {
        d / (mx + mn) as f32
    } else {
        d / (510 - mx - mn) as f32
    };
    Hsl::new(hue_f32(r, g, b, mx, d), s, l)
}

/// Convert HSV values to RGB
///
/// Hue outside [0, 1) yields black.
pub fn hsv_to_rgb(hsv: Hsv) -> (u8, u8, u8) {
    let Hsv { h, s, v } = hsv;
    if s == 0.0 {
        let i = float_to_byte(v);
        return (i, i, i);
    }
    let j = float_to_byte(v);
    let h6 = h * 6.0;
    let e = h6.trunc();
    let f = h6 - e;
    let x = float_to_byte(v * (1.0 - s));
    let y = float_to_byte(v * (1.0 - s * f));
    let z = float_to_byte(v * (1.0 - s * (1.0 - f)));
    match e as i32 {
        0 => (j, z, x),
        1 => (y, j, x),
        2 => (x, j, z),
        3 => (x, y, j),
        4 => (z, x, j),
        5 => (j, x, y),
        _ => (0, 0, 0),
    }
}

/// Convert HSL values to RGB
///
/// Hue outside [0, 1) yields black.
pub fn hsl_to_rgb(hsl: Hsl) -> (u8, u8, u8) {
    let Hsl { h, s, l } = hsl;
    if s == 0.0 {
        let i = float_to_byte(l);
        return (i, i, i);
    }
    let mx = if l <= 0.5 { l * (s + 1.0) } else { l + s - l * s };
    let mn = l * 2.0 - mx;
    let h = h * 6.0;
    let (r, g, b) = match h.floor() as i32 {
        0 => (mx, mn + (mx - mn) * h, mn),
        1 => (mn + (mx - mn) * (2.0 - h), mx, mn),
        2 => (mn, mx, mn + (mx - mn) * (h - 2.0)),
        3 => (mn, mn + (mx - mn) * (4.0 - h), mx),
        4 => (mn + (mx - mn) * (h - 4.0), mn, mx),
        5 => (mx, mn, mn + (mx - mn) * (6.0 - h)),
        _ => return (0, 0, 0),
    };
    (float_to_byte(r), float_to_byte(g), float_to_byte(b))
}

/// Convert RGB values to CMYK
///
/// Grays (r == g == b) carry no chroma: c, m and y are 0.
pub fn rgb_to_cmyk(r: u8, g: u8, b: u8) -> Cmyk {
    if r == g && g == b {
        return Cmyk::new(0.0, 0.0, 0.0, (255 - r as i32) as f32 / 255.0);
    }
    let mx = r.max(g).max(b) as i32;
    let w = mx as f32;
    Cmyk::new(
        (mx - r as i32) as f32 / w,
        (mx - g as i32) as f32 / w,
        (mx - b as i32) as f32 / w,
        (255 - mx) as f32 / 255.0,
    )
}

/// Convert CMYK values to RGB
pub fn cmyk_to_rgb(cmyk: Cmyk) -> (u8, u8, u8) {
    let w = 1.0 - cmyk.k;
    (
        float_to_byte(w - cmyk.c * w),
        float_to_byte(w - cmyk.m * w),
        float_to_byte(w - cmyk.y * w),
    )
}

// ============================================================================
// Double precision, components in [0, 1]
// ============================================================================

fn hue_unit(r: f64, g: f64, b: f64, mx: f64, d: f64) -> f64 {
    let f = (if mx == r {
        (g - b) / d
    } else if mx == g {
        2.0 + (b - r) / d
    } else {
        4.0 + (r - g) / d
    }) / 6.0;
    if f < 0.0 { f + 1.0 } else { f }
}

/// RGB in [0, 1] to (h, s, v) in [0, 1].
pub fn rgb_to_hsv_unit(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let (mx, mn) = max_min(r, g, b);
    if mx == mn {
        return (0.0, 0.0, mx);
    }
    let d = mx - mn;
    (hue_unit(r, g, b, mx, d), d / mx, mx)
}

/// RGB in [0, 1] to (h, s, l) in [0, 1].
pub fn rgb_to_hsl_unit(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let (mx, mn) = max_min(r, g, b);
    let l = (mx + mn) / 2.0;
    if mx == mn {
        return (0.0, 0.0, l);
    }
    let d = mx - mn;
    let s = if l <= 0.5 {
        d / (mx + mn)
    } else {
        d / (2.0 - mx - mn)
    };
    (hue_unit(r, g, b, mx, d), s, l)
}

/// (h, s, v) in [0, 1] to RGB in [0, 1].
pub fn hsv_to_rgb_unit(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (v, v, v);
    }
    let h6 = h * 6.0;
    let e = h6.trunc();
    let f = h6 - e;
    let x = v * (1.0 - s);
    let y = v * (1.0 - s * f);
    let z = v * (1.0 - s * (1.0 - f));
    match e as i32 {
        0 => (v, z, x),
        1 => (y, v, x),
        2 => (x, v, z),
        3 => (x, y, v),
        4 => (z, x, v),
        5 => (v, x, y),
        _ => (0.0, 0.0, 0.0),
    }
}

/// (h, s, l) in [0, 1] to RGB in [0, 1].
pub fn hsl_to_rgb_unit(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }
    let mx = if l <= 0.5 { l * (s + 1.0) } else { l + s - l * s };
    let mn = l * 2.0 - mx;
    let h = h * 6.0;
    match h.floor() as i32 {
        0 => (mx, mn + (mx - mn) * h, mn),
        1 => (mn + (mx - mn) * (2.0 - h), mx, mn),
        2 => (mn, mx, mn + (mx - mn) * (h - 2.0)),
        3 => (mn, mn + (mx - mn) * (4.0 - h), mx),
        4 => (mn + (mx - mn) * (h - 4.0), mn, mx),
        5 => (mx, mn, mn + (mx - mn) * (6.0 - h)),
        _ => (0.0, 0.0, 0.0),
    }
}

/// RGB in [0, 1] to (c, m, y, k) in [0, 1].
pub fn rgb_to_cmyk_unit(r: f64, g: f64, b: f64) -> (f64, f64, f64, f64) {
    if r == g && g == b {
        return (0.0, 0.0, 0.0, 1.0 - r);
    }
    let mx = r.max(g).max(b);
    ((mx - r) / mx, (mx - g) / mx, (mx - b) / mx, 1.0 - mx)
}

/// (c, m, y, k) in [0, 1] to RGB in [0, 1].
pub fn cmyk_to_rgb_unit(c: f64, m: f64, y: f64, k: f64) -> (f64, f64, f64) {
    let channel = |v: f64| 1.0 - (v * (1.0 - k) + k).min(1.0);
    (channel(c), channel(m), channel(y))
}

/// Wrap a hue given in degrees into [0, 1).
pub fn wrap_degrees(deg: f64) -> f64 {
    let h = (deg / 360.0).fract();
    if h < 0.0 { h + 1.0 } else { h }
}

/// Clamp a percentage into [0, 1].
#[inline]
pub(crate) fn percent_to_unit(p: f64) -> f64 {
    p.clamp(0.0, 100.0) / 100.0
}

// ============================================================================
// Conversion utilities in host units
// ============================================================================

/// Color space of a set of channels
///
/// In host units ([`convert`]) RGB components are 0..=255, hues are
/// degrees and the remaining components are percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorSpace {
    #[default]
    Rgb,
    Hsv,
    Hsl,
    Cmyk,
}

impl ColorSpace {
    pub const RGB: i32 = 0;
    pub const HSV: i32 = 1;
    pub const HSL: i32 = 2;
    pub const CMYK: i32 = 3;
    pub const GRAY: i32 = 4;
    /// Flag: an alpha channel accompanies the color channels
    pub const ALPHA: i32 = 0x80;
    /// Flag: the alpha channel holds 7-bit alpha values as is
    pub const RAW: i32 = 0x400;
    pub const RAW_ALPHA: i32 = Self::ALPHA | Self::RAW;

    /// Number of components
    pub fn arity(self) -> usize {
        match self {
            ColorSpace::Cmyk => 4,
            _ => 3,
        }
    }

    /// Name used in diagnostics, with an `A` suffix when alpha is included.
    pub fn name(self, alpha: bool) -> &'static str {
        match (self, alpha) {
            (ColorSpace::Rgb, false) => "RGB",
            (ColorSpace::Hsv, false) => "HSV",
            (ColorSpace::Hsl, false) => "HSL",
            (ColorSpace::Cmyk, false) => "CMYK",
            (ColorSpace::Rgb, true) => "RGBA",
            (ColorSpace::Hsv, true) => "HSVA",
            (ColorSpace::Hsl, true) => "HSLA",
            (ColorSpace::Cmyk, true) => "CMYKA",
        }
    }

    pub fn bits(self) -> i32 {
        match self {
            ColorSpace::Rgb => Self::RGB,
            ColorSpace::Hsv => Self::HSV,
            ColorSpace::Hsl => Self::HSL,
            ColorSpace::Cmyk => Self::CMYK,
        }
    }
}

impl TryFrom<i32> for ColorSpace {
    type Error = ColorError;

    fn try_from(bits: i32) -> ColorResult<Self> {
        match bits {
            Self::RGB => Ok(ColorSpace::Rgb),
            Self::HSV => Ok(ColorSpace::Hsv),
            Self::HSL => Ok(ColorSpace::Hsl),
            Self::CMYK => Ok(ColorSpace::Cmyk),
            _ => Err(ColorError::UnsupportedColorSpace(bits)),
        }
    }
}

/// Color space plus the alpha flags carried alongside it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorSpaceFlags {
    pub space: ColorSpace,
    pub alpha: bool,
    /// Only meaningful together with `alpha`
    pub raw_alpha: bool,
}

impl ColorSpaceFlags {
    pub fn new(space: ColorSpace) -> Self {
        Self {
            space,
            alpha: false,
            raw_alpha: false,
        }
    }

    pub fn with_alpha(mut self, alpha: bool) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_raw_alpha(mut self, raw: bool) -> Self {
        self.raw_alpha = raw;
        self
    }

    /// Decode a color space with its [`ColorSpace::ALPHA`] and
    /// [`ColorSpace::RAW`] flags.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::UnsupportedColorSpace`] for anything but the
    /// four color spaces combined with those flags.
    pub fn from_bits(bits: i32) -> ColorResult<Self> {
        let space = ColorSpace::try_from(bits & !ColorSpace::RAW_ALPHA)
            .map_err(|_| ColorError::UnsupportedColorSpace(bits))?;
        let alpha = bits & ColorSpace::ALPHA != 0;
        Ok(Self {
            space,
            alpha,
            raw_alpha: alpha && bits & ColorSpace::RAW != 0,
        })
    }

    pub fn bits(self) -> i32 {
        let mut bits = self.space.bits();
        if self.alpha {
            bits |= ColorSpace::ALPHA;
            if self.raw_alpha {
                bits |= ColorSpace::RAW;
            }
        }
        bits
    }

    /// Name used in diagnostics.
    pub fn name(self) -> &'static str {
        self.space.name(self.alpha)
    }

    /// Number of channel images, alpha included.
    pub fn channel_count(self) -> usize {
        self.space.arity() + usize::from(self.alpha)
    }
}

impl From<ColorSpace> for ColorSpaceFlags {
    fn from(space: ColorSpace) -> Self {
        Self::new(space)
    }
}

/// Convert color components between models in host units.
///
/// Exactly one side must be [`ColorSpace::Rgb`]. Inputs are clamped into
/// their ranges and hues are wrapped. RGB results are not rounded.
///
/// # Errors
///
/// Returns [`ColorError::InvalidParameters`] for a wrong component count,
/// non-finite components, or a pair of models that does not involve RGB.
pub fn convert(color: &[f64], from: ColorSpace, to: ColorSpace) -> ColorResult<Vec<f64>> {
    if color.len() != from.arity() {
        return Err(ColorError::InvalidParameters(format!(
            "{from:?} needs {} components, got {}",
            from.arity(),
            color.len()
        )));
    }
    if color.iter().any(|v| !v.is_finite()) {
        return Err(ColorError::InvalidParameters(
            "color components must be finite".into(),
        ));
    }
    if (from == ColorSpace::Rgb) == (to == ColorSpace::Rgb) {
        return Err(ColorError::InvalidParameters(format!(
            "cannot convert {from:?} to {to:?}"
        )));
    }
    let scale = |(r, g, b): (f64, f64, f64)| vec![r * 255.0, g * 255.0, b * 255.0];
    match from {
        ColorSpace::Rgb => {
            let r = color[0].clamp(0.0, 255.0) / 255.0;
            let g = color[1].clamp(0.0, 255.0) / 255.0;
            let b = color[2].clamp(0.0, 255.0) / 255.0;
            Ok(match to {
                ColorSpace::Cmyk => {
                    let (c, m, y, k) = rgb_to_cmyk_unit(r, g, b);
                    vec![c * 100.0, m * 100.0, y * 100.0, k * 100.0]
                }
                ColorSpace::Hsl => {
                    let (h, s, l) = rgb_to_hsl_unit(r, g, b);
                    vec![h * 360.0, s * 100.0, l * 100.0]
                }
                _ => {
                    let (h, s, v) = rgb_to_hsv_unit(r, g, b);
                    vec![h * 360.0, s * 100.0, v * 100.0]
                }
            })
        }
        ColorSpace::Cmyk => {
            let p: Vec<f64> = color.iter().map(|&v| percent_to_unit(v)).collect();
            Ok(scale(cmyk_to_rgb_unit(p[0], p[1], p[2], p[3])))
        }
        ColorSpace::Hsl => Ok(scale(hsl_to_rgb_unit(
            wrap_degrees(color[0]),
            percent_to_unit(color[1]),
            percent_to_unit(color[2]),
        ))),
        ColorSpace::Hsv => Ok(scale(hsv_to_rgb_unit(
            wrap_degrees(color[0]),
            percent_to_unit(color[1]),
            percent_to_unit(color[2]),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_hsv_primaries() {
        assert_eq!(rgb_to_hsv(255, 0, 0), Hsv::new(0.0, 1.0, 1.0));
        let green = rgb_to_hsv(0, 255, 0);
        assert!((green.h - 1.0 / 3.0).abs() < 1e-6);
        let gray = rgb_to_hsv(128, 128, 128);
        assert_eq!(gray.h, 0.0);
        assert_eq!(gray.s, 0.0);
    }

    #[test]
    fn test_negative_hue_wraps() {
        // magenta-ish: max is red, g < b
        let hsv = rgb_to_hsv(255, 0, 128);
        assert!(hsv.h > 0.9 && hsv.h < 1.0);
    }

    #[test]
    fn test_hsv_roundtrip_sample() {
        for r in (0..=255).step_by(17) {
            for g in (0..=255).step_by(51) {
                for b in (0..=255).step_by(85) {
                    let (r2, g2, b2) = hsv_to_rgb(rgb_to_hsv(r, g, b));
                    assert!((r as i32 - r2 as i32).abs() <= 1, "{r},{g},{b}");
                    assert!((g as i32 - g2 as i32).abs() <= 1, "{r},{g},{b}");
                    assert!((b as i32 - b2 as i32).abs() <= 1, "{r},{g},{b}");
                }
            }
        }
    }

    #[test]
    fn test_hsl_roundtrip_sample() {
        for r in (0..=255).step_by(15) {
            for g in (0..=255).step_by(51) {
                for b in (0..=255).step_by(85) {
                    let (r2, g2, b2) = hsl_to_rgb(rgb_to_hsl(r, g, b));
                    assert!((r as i32 - r2 as i32).abs() <= 1, "{r},{g},{b}");
                    assert!((g as i32 - g2 as i32).abs() <= 1, "{r},{g},{b}");
                    assert!((b as i32 - b2 as i32).abs() <= 1, "{r},{g},{b}");
                }
            }
        }
    }

    #[test]
    fn test_cmyk() {
        assert_eq!(rgb_to_cmyk(255, 255, 255), Cmyk::new(0.0, 0.0, 0.0, 0.0));
        assert_eq!(rgb_to_cmyk(0, 0, 0), Cmyk::new(0.0, 0.0, 0.0, 1.0));
        let c = rgb_to_cmyk(255, 0, 0);
        assert_eq!(c, Cmyk::new(0.0, 1.0, 1.0, 0.0));
        assert_eq!(cmyk_to_rgb(c), (255, 0, 0));
        assert_eq!(cmyk_to_rgb(rgb_to_cmyk(10, 200, 90)), (10, 200, 90));
    }

    #[test]
    fn test_out_of_range_hue_is_black() {
        assert_eq!(hsv_to_rgb(Hsv::new(1.5, 1.0, 1.0)), (0, 0, 0));
        assert_eq!(hsl_to_rgb(Hsl::new(-0.5, 1.0, 0.5)), (0, 0, 0));
    }

    #[test]
    fn test_unit_conversions() {
        let (r, g, b) = hsl_to_rgb_unit(0.0, 1.0, 0.5);
        assert_eq!((r, g, b), (1.0, 0.0, 0.0));
        let (h, s, l) = rgb_to_hsl_unit(0.0, 0.0, 1.0);
        assert!((h - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!((s, l), (1.0, 0.5));
        assert_eq!(cmyk_to_rgb_unit(0.0, 0.0, 0.0, 1.0), (0.0, 0.0, 0.0));
        assert_eq!(wrap_degrees(-90.0), 0.75);
        assert_eq!(wrap_degrees(720.0), 0.0);
    }

    #[test]
    fn test_convert() {
        let hsl = convert(&[255.0, 0.0, 0.0], ColorSpace::Rgb, ColorSpace::Hsl).unwrap();
        assert_eq!(hsl, vec![0.0, 100.0, 50.0]);
        let rgb = convert(&[120.0, 100.0, 100.0], ColorSpace::Hsv, ColorSpace::Rgb).unwrap();
        assert_eq!(rgb, vec![0.0, 255.0, 0.0]);
        let cmyk = convert(&[0.0, 0.0, 0.0], ColorSpace::Rgb, ColorSpace::Cmyk).unwrap();
        assert_eq!(cmyk, vec![0.0, 0.0, 0.0, 100.0]);
        assert!(convert(&[1.0, 2.0], ColorSpace::Rgb, ColorSpace::Hsl).is_err());
        assert!(convert(&[1.0, 2.0, 3.0], ColorSpace::Hsl, ColorSpace::Hsv).is_err());
        assert!(convert(&[f64::NAN, 0.0, 0.0], ColorSpace::Rgb, ColorSpace::Hsv).is_err());
    }

    #[test]
    fn test_colorspace_flags() {
        let f = ColorSpaceFlags::from_bits(ColorSpace::CMYK | ColorSpace::ALPHA).unwrap();
        assert_eq!(f.space, ColorSpace::Cmyk);
        assert!(f.alpha && !f.raw_alpha);
        assert_eq!(f.name(), "CMYKA");
        assert_eq!(f.channel_count(), 5);

        let raw = ColorSpaceFlags::from_bits(ColorSpace::HSL | ColorSpace::RAW_ALPHA).unwrap();
        assert!(raw.alpha && raw.raw_alpha);
        assert_eq!(raw.bits(), ColorSpace::HSL | ColorSpace::RAW_ALPHA);

        let plain = ColorSpaceFlags::from_bits(ColorSpace::RGB).unwrap();
        assert_eq!(plain, ColorSpaceFlags::new(ColorSpace::Rgb));
        assert!(!ColorSpaceFlags::from_bits(ColorSpace::RAW).unwrap().raw_alpha);

        assert!(ColorSpaceFlags::from_bits(ColorSpace::GRAY).is_err());
        assert!(ColorSpaceFlags::from_bits(0x2000).is_err());
    }
}
