//! Color strings and color allocation
//!
//! Parses the CSS3 color grammar subset used to pass colors as text:
//!
//! - `#rgb` and `#rrggbb`
//! - the 147 SVG color keywords and `transparent`
//! - `rgb()` / `rgba()` with integer or percentage components
//! - `hsl()` / `hsla()`
//! - the non-CSS `hsv()` / `hsva()` and `cmyk()` notations
//!
//! Input is trimmed and matched case-insensitively. Components are clamped
//! into range and hues wrap around.
//!
//! [`fetch_color`] turns either an integer color or a color string into a
//! packed ARGB value for a given image, and the `color_allocate_*` family
//! resolves a color in an image's palette.

use crate::colorspace::{
    cmyk_to_rgb_unit, hsl_to_rgb_unit, hsv_to_rgb_unit, percent_to_unit, wrap_degrees,
};
use crate::error::{ColorError, ColorResult};
use crate::svg::SVG_COLORS;
use pixkit_core::color::{self, float_to_alpha};
use pixkit_core::{Pix, PixMut};

/// A parsed color string
///
/// `alpha` is an opacity in [0, 1] (1 is opaque), as in CSS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CssColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: f64,
}

impl CssColor {
    /// Create an opaque color.
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 1.0,
        }
    }

    /// Alpha converted to the 7-bit image scale (0 opaque, 127 transparent).
    pub fn image_alpha(&self) -> u8 {
        float_to_alpha(self.alpha as f32)
    }

    /// Packed ARGB value with 7-bit alpha.
    pub fn argb(&self) -> u32 {
        color::compose_argb(self.red, self.green, self.blue, self.image_alpha())
    }
}

/// Look up an SVG color keyword (lowercase).
pub fn svg_color(name: &str) -> Option<(u8, u8, u8)> {
    SVG_COLORS
        .binary_search_by(|(n, _)| (*n).cmp(name))
        .ok()
        .map(|i| {
            let [r, g, b] = SVG_COLORS[i].1;
            (r, g, b)
        })
}

/// All SVG color keywords with their RGB values, sorted by name.
pub fn svg_color_table() -> impl Iterator<Item = (&'static str, (u8, u8, u8))> {
    SVG_COLORS.iter().map(|(n, [r, g, b])| (*n, (*r, *g, *b)))
}

/// Parse a color string.
///
/// Returns `None` when the string matches no supported form.
///
/// # Examples
///
/// ```
/// use pixkit_color::css::{CssColor, parse_css_color};
///
/// assert_eq!(parse_css_color(" #F00 "), Some(CssColor::rgb(255, 0, 0)));
/// assert_eq!(parse_css_color("teal"), Some(CssColor::rgb(0, 128, 128)));
/// assert!(parse_css_color("rgb(1,2)").is_none());
/// ```
pub fn parse_css_color(text: &str) -> Option<CssColor> {
    let s = text.trim().to_ascii_lowercase();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if !s.starts_with(|c: char| c.is_ascii_lowercase()) {
        return None;
    }
    if s == "transparent" {
        return Some(CssColor {
            alpha: 0.0,
            ..CssColor::rgb(0, 0, 0)
        });
    }
    if let Some((r, g, b)) = svg_color(&s) {
        return Some(CssColor::rgb(r, g, b));
    }
    let (name, args) = split_function(&s)?;
    match name {
        "rgb" | "rgba" => parse_rgb(&args, name == "rgba"),
        "hsl" | "hsla" => parse_hue_based(&args, name == "hsla", hsl_to_rgb_unit),
        "hsv" | "hsva" => parse_hue_based(&args, name == "hsva", hsv_to_rgb_unit),
        "cmyk" => parse_cmyk(&args),
        _ => None,
    }
}

/// Parse a color string, falling back to opaque black.
///
/// The flag reports whether parsing succeeded.
pub fn parse_css_color_or_default(text: &str) -> (CssColor, bool) {
    match parse_css_color(text) {
        Some(c) => (c, true),
        None => (CssColor::rgb(0, 0, 0), false),
    }
}

fn parse_hex(hex: &str) -> Option<CssColor> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        6 => Some(CssColor::rgb(pair(0)?, pair(2)?, pair(4)?)),
        3 => {
            let (r, g, b) = (digit(0)?, digit(1)?, digit(2)?);
            Some(CssColor::rgb(r << 4 | r, g << 4 | g, b << 4 | b))
        }
        _ => None,
    }
}

/// One functional-notation argument
#[derive(Debug, Clone, Copy)]
enum Arg {
    Number(f64),
    Percent(f64),
}

impl Arg {
    fn number(self) -> Option<f64> {
        match self {
            Arg::Number(v) => Some(v),
            Arg::Percent(_) => None,
        }
    }

    fn percent(self) -> Option<f64> {
        match self {
            Arg::Percent(v) => Some(v),
            Arg::Number(_) => None,
        }
    }
}

/// Split `name(a, b, ...)` into the name and its parsed arguments.
fn split_function(s: &str) -> Option<(&str, Vec<Arg>)> {
    let open = s.find('(')?;
    let inner = s[open + 1..].strip_suffix(')')?;
    let name = s[..open].trim_end();
    let args = inner
        .split(',')
        .map(|a| {
            let a = a.trim();
            match a.strip_suffix('%') {
                Some(p) => p.trim_end().parse::<f64>().ok().map(Arg::Percent),
                None => a.parse::<f64>().ok().map(Arg::Number),
            }
        })
        .collect::<Option<Vec<_>>>()?;
    if args.iter().any(|a| match a {
        Arg::Number(v) | Arg::Percent(v) => !v.is_finite(),
    }) {
        return None;
    }
    Some((name, args))
}

/// Alpha argument of the `*a()` forms, clamped into [0, 1].
fn alpha_arg(args: &[Arg], with_alpha: bool, count: usize) -> Option<f64> {
    if with_alpha {
        (args.len() == count + 1).then_some(())?;
        Some(args[count].number()?.clamp(0.0, 1.0))
    } else {
        (args.len() == count).then_some(1.0)
    }
}

fn parse_rgb(args: &[Arg], with_alpha: bool) -> Option<CssColor> {
    let alpha = alpha_arg(args, with_alpha, 3)?;
    let head = &args[..3];
    let channels: Vec<u8> = if head.iter().all(|a| matches!(a, Arg::Percent(_))) {
        head.iter()
            .map(|a| a.percent().map(|p| (p.clamp(0.0, 100.0) * 2.555) as u8))
            .collect::<Option<_>>()?
    } else {
        // integer form: no fractions, no percent signs
        head.iter()
            .map(|a| {
                let v = a.number()?;
                (v.fract() == 0.0).then(|| v.clamp(0.0, 255.0) as u8)
            })
            .collect::<Option<_>>()?
    };
    Some(CssColor {
        red: channels[0],
        green: channels[1],
        blue: channels[2],
        alpha,
    })
}

fn unit_to_byte(v: f64) -> u8 {
    (v * 255.5) as u8
}

fn parse_hue_based(
    args: &[Arg],
    with_alpha: bool,
    to_rgb: fn(f64, f64, f64) -> (f64, f64, f64),
) -> Option<CssColor> {
    let alpha = alpha_arg(args, with_alpha, 3)?;
    let h = wrap_degrees(args[0].number()?);
    let s = percent_to_unit(args[1].percent()?);
    let l = percent_to_unit(args[2].percent()?);
    let (r, g, b) = to_rgb(h, s, l);
    Some(CssColor {
        red: unit_to_byte(r),
        green: unit_to_byte(g),
        blue: unit_to_byte(b),
        alpha,
    })
}

fn parse_cmyk(args: &[Arg]) -> Option<CssColor> {
    if args.len() != 4 {
        return None;
    }
    let p = args
        .iter()
        .map(|a| a.percent().map(percent_to_unit))
        .collect::<Option<Vec<_>>>()?;
    let (r, g, b) = cmyk_to_rgb_unit(p[0], p[1], p[2], p[3]);
    Some(CssColor::rgb(unit_to_byte(r), unit_to_byte(g), unit_to_byte(b)))
}

// ============================================================================
// Color fetch and allocation
// ============================================================================

/// A color given either as an integer value or as a color string
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpec {
    /// Packed ARGB for truecolor images, palette index for indexed ones
    Value(i64),
    /// Color string, see [`parse_css_color`]
    Css(String),
}

impl From<i64> for ColorSpec {
    fn from(v: i64) -> Self {
        ColorSpec::Value(v)
    }
}

impl From<&str> for ColorSpec {
    fn from(s: &str) -> Self {
        ColorSpec::Css(s.to_string())
    }
}

/// Resolve a color specification to packed ARGB for `image`.
///
/// Integer values must be valid 31-bit ARGB when `image` is `None` or
/// truecolor. For an indexed image they name an allocated palette entry,
/// which is reported as ARGB with the transparent index at alpha 127.
///
/// # Errors
///
/// Returns [`ColorError::InvalidColor`] when the value does not fit the
/// image or the string cannot be parsed.
pub fn fetch_color(spec: &ColorSpec, image: Option<&Pix>) -> ColorResult<u32> {
    match spec {
        ColorSpec::Value(v) => {
            let v = *v;
            match image.and_then(|im| im.palette()) {
                None => {
                    if color::is_valid_argb(v) {
                        Ok(v as u32)
                    } else {
                        Err(ColorError::InvalidColor(format!("{v:#x}")))
                    }
                }
                Some(pal) => u8::try_from(v)
                    .ok()
                    .and_then(|i| pal.argb(i))
                    .ok_or_else(|| ColorError::InvalidColor(format!("palette index {v}"))),
            }
        }
        ColorSpec::Css(s) => parse_css_color(s)
            .map(|c| c.argb())
            .ok_or_else(|| ColorError::InvalidColor(s.clone())),
    }
}

/// Resolve a color in an image: the packed ARGB value for truecolor
/// images, a palette index (exact, newly allocated or closest) otherwise.
fn resolve(image: &mut PixMut, r: u8, g: u8, b: u8, a: u8) -> u32 {
    let a = a.min(color::MAX_ALPHA);
    match image.palette_mut() {
        Some(pal) => pal.resolve(r, g, b, a) as u32,
        None => color::compose_argb(r, g, b, a),
    }
}

/// Allocate a color given as a color string.
pub fn color_allocate_css(image: &mut PixMut, text: &str) -> ColorResult<u32> {
    let c = parse_css_color(text).ok_or_else(|| ColorError::InvalidColor(text.to_string()))?;
    Ok(resolve(image, c.red, c.green, c.blue, c.image_alpha()))
}

fn check_finite(values: &[f64]) -> ColorResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ColorError::InvalidParameters(
            "color components must be finite".into(),
        ))
    }
}

/// Allocate a color from hue (degrees), saturation and lightness
/// (percent) and a 7-bit alpha.
pub fn color_allocate_hsl(
    image: &mut PixMut,
    hue: f64,
    saturation: f64,
    lightness: f64,
    alpha: i32,
) -> ColorResult<u32> {
    check_finite(&[hue, saturation, lightness])?;
    let (r, g, b) = hsl_to_rgb_unit(
        wrap_degrees(hue),
        percent_to_unit(saturation),
        percent_to_unit(lightness),
    );
    Ok(resolve(
        image,
        unit_to_byte(r),
        unit_to_byte(g),
        unit_to_byte(b),
        alpha.clamp(0, 127) as u8,
    ))
}

/// Allocate a color from hue (degrees), saturation and value (percent)
/// and a 7-bit alpha.
pub fn color_allocate_hsv(
    image: &mut PixMut,
    hue: f64,
    saturation: f64,
    value: f64,
    alpha: i32,
) -> ColorResult<u32> {
    check_finite(&[hue, saturation, value])?;
    let (r, g, b) = hsv_to_rgb_unit(
        wrap_degrees(hue),
        percent_to_unit(saturation),
        percent_to_unit(value),
    );
    Ok(resolve(
        image,
        unit_to_byte(r),
        unit_to_byte(g),
        unit_to_byte(b),
        alpha.clamp(0, 127) as u8,
    ))
}

/// Allocate a color from CMYK percentages and a 7-bit alpha.
pub fn color_allocate_cmyk(
    image: &mut PixMut,
    cyan: f64,
    magenta: f64,
    yellow: f64,
    black: f64,
    alpha: i32,
) -> ColorResult<u32> {
    check_finite(&[cyan, magenta, yellow, black])?;
    let (r, g, b) = cmyk_to_rgb_unit(
        percent_to_unit(cyan),
        percent_to_unit(magenta),
        percent_to_unit(yellow),
        percent_to_unit(black),
    );
    Ok(resolve(
        image,
        unit_to_byte(r),
        unit_to_byte(g),
        unit_to_byte(b),
        alpha.clamp(0, 127) as u8,
    ))
}
