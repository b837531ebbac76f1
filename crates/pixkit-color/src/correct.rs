//! Color correction
//!
//! Applies levels, gamma, tone curves and negation to the channels of an
//! image in RGB, HSV, HSL or CMYK, plus hue rotation in HSV/HSL and an
//! optional pass over the alpha channel.
//!
//! # Parameters
//!
//! [`ColorCorrectionParams`] mirrors the nested option maps callers pass
//! in and deserializes from JSON with the same keys:
//!
//! ```json
//! {"gamma": 1.8, "r": {"levels": [16, 235]}, "h": 90,
//!  "s": {"tonecurve": [[0.5, 0.6]]}, "a": {"negate": true}}
//! ```
//!
//! Top-level entries apply to all RGB channels and are overridden per key
//! by the `r`, `g` and `b` blocks. The other color spaces read only their
//! own channel blocks (`h` is a rotation in degrees, `s`, `v`, `l`, `c`,
//! `m`, `y`, `k`). `a` is read when alpha correction is requested.
//!
//! # Pipeline
//!
//! Each channel value `z` in [0, 1] goes through, in order:
//!
//! 1. levels (with gamma inside the input range) or gamma alone
//! 2. the tone curve
//! 3. negation (`1 - z`)

use crate::colorspace::{
    Cmyk, ColorSpace, ColorSpaceFlags, Hsl, Hsv, cmyk_to_rgb, hsl_to_rgb, hsv_to_rgb, rgb_to_cmyk,
    rgb_to_hsl, rgb_to_hsv,
};
use crate::error::{ColorError, ColorResult};
use crate::spline::Spline;
use pixkit_core::PixMut;
use pixkit_core::color::{self, MAX_ALPHA, float_to_alpha, float_to_byte};
use serde::Deserialize;
use tracing::{info, warn};

const GAMMA_MAX: f64 = 1000.0;
const GAMMA_MIN: f64 = 0.001;

// ============================================================================
// Parameters
// ============================================================================

/// Correction options for one channel
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChannelCorrectionParams {
    /// `[min_in, max_in]` or `[min_in, max_in, min_out, max_out]` in 0..=255
    pub levels: Option<Vec<f64>>,
    /// Gamma; non-finite or non-positive values mean 1
    pub gamma: Option<f64>,
    /// Inner tone curve points; (0, 0) and (1, 1) are added around them
    pub tonecurve: Option<Vec<Vec<f64>>>,
    /// Complete tone curve points; takes precedence over `tonecurve`
    pub tonecurve2: Option<Vec<Vec<f64>>>,
    pub negate: Option<bool>,
}

impl ChannelCorrectionParams {
    /// Load from JSON text.
    pub fn from_json(text: &str) -> ColorResult<Self> {
        serde_json::from_str(text).map_err(|e| ColorError::InvalidParameters(e.to_string()))
    }

    pub fn with_levels(mut self, levels: &[f64]) -> Self {
        self.levels = Some(levels.to_vec());
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = Some(gamma);
        self
    }

    pub fn with_tonecurve(mut self, points: &[(f64, f64)]) -> Self {
        self.tonecurve = Some(points.iter().map(|&(x, y)| vec![x, y]).collect());
        self
    }

    pub fn with_tonecurve2(mut self, points: &[(f64, f64)]) -> Self {
        self.tonecurve2 = Some(points.iter().map(|&(x, y)| vec![x, y]).collect());
        self
    }

    pub fn with_negate(mut self, negate: bool) -> Self {
        self.negate = Some(negate);
        self
    }

    /// True if no option is present.
    pub fn is_empty(&self) -> bool {
        self.levels.is_none()
            && self.gamma.is_none()
            && self.tonecurve.is_none()
            && self.tonecurve2.is_none()
            && self.negate.is_none()
    }

    /// Options of `self` replaced by those present in `over`. Either tone
    /// curve key in `over` replaces both of `self`.
    fn overlay(&self, over: &Self) -> Self {
        let (tonecurve, tonecurve2) = if over.tonecurve.is_some() || over.tonecurve2.is_some() {
            (over.tonecurve.clone(), over.tonecurve2.clone())
        } else {
            (self.tonecurve.clone(), self.tonecurve2.clone())
        };
        Self {
            levels: over.levels.clone().or_else(|| self.levels.clone()),
            gamma: over.gamma.or(self.gamma),
            tonecurve,
            tonecurve2,
            negate: over.negate.or(self.negate),
        }
    }
}

/// Hue rotation in degrees
///
/// Integers rotate by whole degrees modulo 360; floats by the fractional
/// part of `degrees / 360`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HueRotation {
    Degrees(i64),
    Fractional(f64),
}

impl HueRotation {
    /// Rotation as a fraction of a turn in [0, 1).
    pub fn turns(self) -> f32 {
        let r = match self {
            HueRotation::Degrees(d) => (d % 360) as f32 / 360.0,
            HueRotation::Fractional(d) if d.is_finite() => ((d / 360.0) % 1.0) as f32,
            HueRotation::Fractional(_) => 0.0,
        };
        let r = if r < 0.0 { r + 1.0 } else { r };
        if r >= 1.0 { r - 1.0 } else { r }
    }
}

impl From<i64> for HueRotation {
    fn from(d: i64) -> Self {
        HueRotation::Degrees(d)
    }
}

impl From<f64> for HueRotation {
    fn from(d: f64) -> Self {
        HueRotation::Fractional(d)
    }
}

/// Correction options for a whole image
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColorCorrectionParams {
    /// Options shared by the R, G and B channels
    #[serde(flatten)]
    pub common: ChannelCorrectionParams,
    pub r: Option<ChannelCorrectionParams>,
    pub g: Option<ChannelCorrectionParams>,
    pub b: Option<ChannelCorrectionParams>,
    pub h: Option<HueRotation>,
    pub s: Option<ChannelCorrectionParams>,
    pub v: Option<ChannelCorrectionParams>,
    pub l: Option<ChannelCorrectionParams>,
    pub c: Option<ChannelCorrectionParams>,
    pub m: Option<ChannelCorrectionParams>,
    pub y: Option<ChannelCorrectionParams>,
    pub k: Option<ChannelCorrectionParams>,
    pub a: Option<ChannelCorrectionParams>,
}

impl ColorCorrectionParams {
    /// Load from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::InvalidParameters`] if the text is not a JSON
    /// object of the expected shape.
    pub fn from_json(text: &str) -> ColorResult<Self> {
        serde_json::from_str(text).map_err(|e| ColorError::InvalidParameters(e.to_string()))
    }
}

// ============================================================================
// Channel pipeline
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
struct Levels {
    min_in: f32,
    max_in: f32,
    in_range: f32,
    min_out: f32,
    max_out: f32,
    out_range: f32,
    inclination: f32,
}

impl Levels {
    fn parse(values: &[f64]) -> ColorResult<Self> {
        if values.len() != 2 && values.len() != 4 {
            return Err(invalid(ColorError::InvalidLevels));
        }
        let int = |v: f64| if v.is_finite() { v as i64 } else { 0 };
        let min_in = int(values[0]).max(0);
        let max_in = int(values[1]).min(255);
        let (min_out, max_out) = if values.len() == 4 {
            (int(values[2]).max(0), int(values[3]).min(255))
        } else {
            (0, 255)
        };
        if min_in >= max_in || min_out >= max_out {
            return Err(invalid(ColorError::InvalidLevels));
        }
        let in_range = (max_in - min_in) as f32;
        let out_range = (max_out - min_out) as f32;
        Ok(Self {
            min_in: min_in as f32 / 255.0,
            max_in: max_in as f32 / 255.0,
            in_range: in_range / 255.0,
            min_out: min_out as f32 / 255.0,
            max_out: max_out as f32 / 255.0,
            out_range: out_range / 255.0,
            inclination: out_range / in_range,
        })
    }
}

fn invalid(err: ColorError) -> ColorError {
    warn!("{err}");
    err
}

fn reciprocal_gamma(gamma: f64) -> f32 {
    if gamma.is_finite() && gamma > 0.0 {
        (1.0 / gamma.clamp(GAMMA_MIN, GAMMA_MAX)) as f32
    } else {
        1.0
    }
}

fn tone_curve(points: &[Vec<f64>], with_edges: bool) -> ColorResult<Spline> {
    if points.len() < if with_edges { 1 } else { 2 } {
        return Err(invalid(ColorError::InvalidToneCurve));
    }
    let mut spline = Spline::new();
    if with_edges {
        spline.add_point(0.0, 0.0);
    }
    for p in points {
        let &[x, y] = p.as_slice() else {
            return Err(invalid(ColorError::InvalidToneCurve));
        };
        if !spline.add_point(x, y) {
            return Err(invalid(ColorError::InvalidToneCurve));
        }
    }
    if with_edges && !spline.add_point(1.0, 1.0) {
        return Err(invalid(ColorError::InvalidToneCurve));
    }
    if !spline.close() {
        return Err(invalid(ColorError::ToneCurveNotClosed));
    }
    Ok(spline)
}

/// Levels, gamma, tone curve and negation for one channel
#[derive(Debug, Clone)]
pub struct ChannelPipeline {
    levels: Option<Levels>,
    r_gamma: f32,
    curve: Option<Spline>,
    negate: bool,
}

impl ChannelPipeline {
    /// Build the pipeline for a parameter block.
    ///
    /// Returns `Ok(None)` when the block holds no options.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::InvalidLevels`], [`ColorError::InvalidToneCurve`]
    /// or [`ColorError::ToneCurveNotClosed`] for malformed options.
    pub fn new(params: &ChannelCorrectionParams) -> ColorResult<Option<Self>> {
        if params.is_empty() {
            return Ok(None);
        }
        let levels = params.levels.as_deref().map(Levels::parse).transpose()?;
        let r_gamma = params.gamma.map_or(1.0, reciprocal_gamma);
        let curve = match (&params.tonecurve2, &params.tonecurve) {
            (Some(points), _) => Some(tone_curve(points, false)?),
            (None, Some(points)) => Some(tone_curve(points, true)?),
            (None, None) => None,
        };
        Ok(Some(Self {
            levels,
            r_gamma,
            curve,
            negate: params.negate.unwrap_or(false),
        }))
    }

    /// Map a channel value in [0, 1].
    pub fn apply(&self, z: f32) -> f32 {
        let mut z = z;
        if let Some(lv) = &self.levels {
            z = if z <= lv.min_in {
                lv.min_out
            } else if z >= lv.max_in {
                lv.max_out
            } else if self.r_gamma != 1.0 {
                lv.min_out + lv.out_range * ((z - lv.min_in) / lv.in_range).powf(self.r_gamma)
            } else {
                lv.min_out + lv.inclination * (z - lv.min_in)
            };
        } else if self.r_gamma != 1.0 {
            z = z.powf(self.r_gamma);
        }
        if let Some(curve) = &self.curve {
            z = curve.interpolate(z as f64) as f32;
        }
        if self.negate {
            z = 1.0 - z;
        }
        z
    }
}

/// Pipeline for an optional channel block, identity when absent.
fn pipeline(params: Option<&ChannelCorrectionParams>) -> ColorResult<Option<ChannelPipeline>> {
    params.map_or(Ok(None), ChannelPipeline::new)
}

fn run(p: &Option<ChannelPipeline>, z: f32) -> f32 {
    p.as_ref().map_or(z, |p| p.apply(z))
}

// ============================================================================
// Image correction
// ============================================================================

/// Result of a correction that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectOutcome {
    /// Pixels were rewritten
    Applied,
    /// The parameters held nothing for the requested channels
    NothingToDo,
}

impl CorrectOutcome {
    fn or(self, other: CorrectOutcome) -> CorrectOutcome {
        if self == CorrectOutcome::Applied || other == CorrectOutcome::Applied {
            CorrectOutcome::Applied
        } else {
            CorrectOutcome::NothingToDo
        }
    }
}

/// Rewrite every pixel of a truecolor image through `f`.
fn map_pixels(image: &mut PixMut, f: impl Fn(u8, u8, u8, u8) -> u32) {
    image.convert_to_truecolor();
    for px in image.data_mut() {
        let (r, g, b, a) = color::extract_argb(*px);
        *px = f(r, g, b, a);
    }
}

fn correct_rgb(image: &mut PixMut, params: &ColorCorrectionParams) -> ColorResult<CorrectOutcome> {
    let common = &params.common;
    let chans = [&params.r, &params.g, &params.b];
    if common.is_empty() && chans.iter().all(|c| c.as_ref().is_none_or(|c| c.is_empty())) {
        return Ok(CorrectOutcome::NothingToDo);
    }
    // a malformed shared block fails even when every channel overrides it
    ChannelPipeline::new(common)?;
    let mut p = Vec::with_capacity(3);
    for ch in chans {
        let merged = match ch {
            Some(ch) => common.overlay(ch),
            None => common.clone(),
        };
        p.push(ChannelPipeline::new(&merged)?);
    }

    let byte = |p: &Option<ChannelPipeline>, v: u8| float_to_byte(run(p, v as f32 / 255.0));
    map_pixels(image, |r, g, b, a| {
        color::compose_argb(byte(&p[0], r), byte(&p[1], g), byte(&p[2], b), a)
    });
    Ok(CorrectOutcome::Applied)
}

fn correct_hsv(
    image: &mut PixMut,
    params: &ColorCorrectionParams,
    lightness: bool,
) -> ColorResult<CorrectOutcome> {
    let rotation = params.h.map_or(0.0, HueRotation::turns);
    let value = if lightness { &params.l } else { &params.v };
    let ps = pipeline(params.s.as_ref())?;
    let pv = pipeline(value.as_ref())?;
    if params.h.is_none() && ps.is_none() && pv.is_none() {
        return Ok(CorrectOutcome::NothingToDo);
    }

    let rotate = |h: f32| {
        if rotation == 0.0 {
            return h;
        }
        let h = h + rotation;
        if h >= 1.0 { h - 1.0 } else { h }
    };
    map_pixels(image, |r, g, b, a| {
        let (r, g, b) = if lightness {
            let Hsl { h, s, l } = rgb_to_hsl(r, g, b);
            hsl_to_rgb(Hsl::new(rotate(h), run(&ps, s), run(&pv, l)))
        } else {
            let Hsv { h, s, v } = rgb_to_hsv(r, g, b);
            hsv_to_rgb(Hsv::new(rotate(h), run(&ps, s), run(&pv, v)))
        };
        color::compose_argb(r, g, b, a)
    });
    Ok(CorrectOutcome::Applied)
}

fn correct_cmyk(image: &mut PixMut, params: &ColorCorrectionParams) -> ColorResult<CorrectOutcome> {
    let pc = pipeline(params.c.as_ref())?;
    let pm = pipeline(params.m.as_ref())?;
    let py = pipeline(params.y.as_ref())?;
    let pk = pipeline(params.k.as_ref())?;
    if pc.is_none() && pm.is_none() && py.is_none() && pk.is_none() {
        return Ok(CorrectOutcome::NothingToDo);
    }

    map_pixels(image, |r, g, b, a| {
        let Cmyk { c, m, y, k } = rgb_to_cmyk(r, g, b);
        let (r, g, b) = cmyk_to_rgb(Cmyk::new(
            run(&pc, c),
            run(&pm, m),
            run(&py, y),
            run(&pk, k),
        ));
        color::compose_argb(r, g, b, a)
    });
    Ok(CorrectOutcome::Applied)
}

fn correct_alpha(image: &mut PixMut, pa: &ChannelPipeline) {
    let max = MAX_ALPHA as f32;
    map_pixels(image, |r, g, b, a| {
        let opacity = (max - a as f32) / max;
        color::compose_argb(r, g, b, float_to_alpha(pa.apply(opacity)))
    });
}

/// Correct the colors of an image.
///
/// `space` selects which channel blocks of `params` apply; with the alpha
/// flag set (see [`ColorSpaceFlags`]) the `a` block is applied afterwards.
/// Indexed images are converted to truecolor before anything is written.
///
/// Returns [`CorrectOutcome::NothingToDo`] and leaves the image untouched
/// when no relevant option is present.
///
/// # Errors
///
/// Returns [`ColorError::InvalidLevels`], [`ColorError::InvalidToneCurve`]
/// or [`ColorError::ToneCurveNotClosed`] for malformed options. Every
/// requested block is parsed before the first pixel is written, so a
/// failing call leaves the image untouched.
pub fn color_correct(
    image: &mut PixMut,
    params: &ColorCorrectionParams,
    space: impl Into<ColorSpaceFlags>,
) -> ColorResult<CorrectOutcome> {
    let flags = space.into();
    let alpha = if flags.alpha {
        pipeline(params.a.as_ref())?
    } else {
        None
    };
    let mut outcome = match flags.space {
        ColorSpace::Rgb => correct_rgb(image, params)?,
        ColorSpace::Hsv => correct_hsv(image, params, false)?,
        ColorSpace::Hsl => correct_hsv(image, params, true)?,
        ColorSpace::Cmyk => correct_cmyk(image, params)?,
    };
    if let Some(pa) = &alpha {
        correct_alpha(image, pa);
        outcome = outcome.or(CorrectOutcome::Applied);
    }
    if outcome == CorrectOutcome::NothingToDo {
        info!("Nothing to do.");
    }
    Ok(outcome)
}

/// Map each of the 256 input levels through one channel pipeline.
///
/// # Errors
///
/// Returns [`ColorError::NothingToDo`] for an empty block and the parse
/// errors of [`ChannelPipeline::new`].
pub fn simulate_f32(params: &ChannelCorrectionParams) -> ColorResult<Vec<f32>> {
    let p = ChannelPipeline::new(params)?.ok_or(ColorError::NothingToDo)?;
    Ok((0..=255u8).map(|i| p.apply(i as f32 / 255.0)).collect())
}

/// Byte version of [`simulate_f32`].
pub fn simulate(params: &ChannelCorrectionParams) -> ColorResult<Vec<u8>> {
    Ok(simulate_f32(params)?.into_iter().map(float_to_byte).collect())
}
