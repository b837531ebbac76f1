//! Image scaling with fit policies
//!
//! [`scale`] resizes an image toward a target size under one of several
//! policies:
//!
//! | Mode | Result size | Resampled |
//! |---|---|---|
//! | `None` | target | no, source placed by position |
//! | `Crop` | target clipped to the source | no |
//! | `Tile` | target | no, source repeated |
//! | `Fit` | within target, aspect kept | yes |
//! | `Fill` | target, source cropped to the target aspect | yes |
//! | `Pad` | target, fitted content placed by position | yes |
//! | `Stretch` | target | yes |
//! | `Carve` | target, fitted then seam carved | yes |
//!
//! Resampling averages the source area covered by each destination pixel,
//! weighting colors by opacity so transparent pixels do not darken their
//! neighbors.

use crate::carve::{CarveOptions, EnergyCarver, SeamCarver, carve};
use crate::{TransformError, TransformResult};
use pixkit_color::{ColorSpec, fetch_color};
use pixkit_core::color::{self, ALPHA_TRANSPARENT, MAX_ALPHA, alpha_blend};
use pixkit_core::{Pix, PixMut, Position};
use tracing::{debug, warn};

/// Scaling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMode {
    /// Place the source unscaled on a target-sized canvas
    None,
    /// Cut the source down to the target, never growing it
    Crop,
    /// Shrink or grow to fit inside the target, keeping the aspect ratio
    #[default]
    Fit,
    /// Cover the whole target, cropping the source to its aspect ratio
    Fill,
    /// Fit, then place the result on a target-sized canvas
    Pad,
    /// Resample to exactly the target size
    Stretch,
    /// Repeat the source over a target-sized canvas
    Tile,
    /// Fit by the shorter axis, then seam carve to the target size
    Carve,
}

impl TryFrom<i32> for ScaleMode {
    type Error = TransformError;

    fn try_from(value: i32) -> TransformResult<Self> {
        Ok(match value {
            0 => ScaleMode::None,
            1 => ScaleMode::Crop,
            2 => ScaleMode::Fit,
            3 => ScaleMode::Fill,
            4 => ScaleMode::Pad,
            5 => ScaleMode::Stretch,
            6 => ScaleMode::Tile,
            7 => ScaleMode::Carve,
            _ => {
                warn!("Unsupported mode given ({value})");
                return Err(TransformError::UnsupportedMode(value));
            }
        })
    }
}

/// Options for [`scale`]
#[derive(Debug, Clone, Default)]
pub struct ScaleOptions {
    /// Where the source is anchored when it is cropped, placed or tiled
    pub position: Position,
    /// Canvas color, resolved against the source image; the canvas is
    /// opaque black without one
    pub background: Option<ColorSpec>,
    /// Parameters for [`ScaleMode::Carve`]
    pub carve: CarveOptions,
}

impl ScaleOptions {
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_background(mut self, background: impl Into<ColorSpec>) -> Self {
        self.background = Some(background.into());
        self
    }

    pub fn with_carve(mut self, carve: CarveOptions) -> Self {
        self.carve = carve;
        self
    }
}

/// Axis-aligned rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

/// Geometry computed for one scale request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalePlan {
    /// Mode after fallbacks (tile becomes none when the source covers the
    /// target)
    pub mode: ScaleMode,
    /// Size of the canvas to create
    pub canvas: (u32, u32),
    /// Source area to copy
    pub src: Rect,
    /// Destination area; for unresampled copies only its origin is used
    pub dst: Rect,
}

fn round_dim(v: f64) -> i32 {
    (v.round() as i32).max(1)
}

/// Compute canvas size and copy rectangles for scaling a
/// `src_w` x `src_h` image to `width` x `height`.
///
/// # Errors
///
/// Returns [`TransformError::InvalidDimensions`] when a target dimension
/// is below 1 or beyond `i32::MAX`.
pub fn plan(
    src_w: u32,
    src_h: u32,
    width: u32,
    height: u32,
    mode: ScaleMode,
    position: Position,
) -> TransformResult<ScalePlan> {
    if width < 1 || height < 1 || width > i32::MAX as u32 || height > i32::MAX as u32 {
        warn!(width, height, "Invalid image dimensions");
        return Err(TransformError::InvalidDimensions {
            width: width as i64,
            height: height as i64,
        });
    }
    let (mut dst_w, mut dst_h) = (width as i32, height as i32);
    let (mut src_w, mut src_h) = (src_w as i32, src_h as i32);
    let dst_r = dst_w as f64 / dst_h as f64;
    let src_r = src_w as f64 / src_h as f64;
    let fit_w = round_dim(dst_h as f64 * src_r);
    let fit_h = round_dim(dst_w as f64 / src_r);
    let fill_w = round_dim(src_h as f64 * dst_r);
    let fill_h = round_dim(src_w as f64 / dst_r);
    let (mut src_x, mut src_y, mut dst_x, mut dst_y) = (0, 0, 0, 0);
    let mut mode = mode;

    match mode {
        ScaleMode::None | ScaleMode::Crop | ScaleMode::Tile => {
            if mode == ScaleMode::Tile && src_w >= dst_w && src_h >= dst_h {
                mode = ScaleMode::None;
            }
            if src_w > dst_w {
                src_x = position.x_offset(src_w, dst_w);
                src_w = dst_w;
            } else if src_w < dst_w {
                if mode == ScaleMode::Crop {
                    dst_w = src_w;
                } else {
                    dst_x = position.x_offset(dst_w, src_w);
                }
            }
            if src_h > dst_h {
                src_y = position.y_offset(src_h, dst_h);
                src_h = dst_h;
            } else if src_h < dst_h {
                if mode == ScaleMode::Crop {
                    dst_h = src_h;
                } else {
                    dst_y = position.y_offset(dst_h, src_h);
                }
            }
            let canvas = (dst_w as u32, dst_h as u32);
            return Ok(ScalePlan {
                mode,
                canvas,
                src: Rect::new(src_x, src_y, src_w, src_h),
                dst: Rect::new(dst_x, dst_y, src_w, src_h),
            });
        }
        ScaleMode::Fit => {
            if src_r > dst_r {
                dst_h = fit_h;
            } else if src_r < dst_r {
                dst_w = fit_w;
            }
        }
        ScaleMode::Fill => {
            if src_r > dst_r {
                src_x = position.x_offset(src_w, fill_w);
                src_w = fill_w;
            } else if src_r < dst_r {
                src_y = position.y_offset(src_h, fill_h);
                src_h = fill_h;
            }
        }
        ScaleMode::Stretch => {}
        ScaleMode::Pad => {
            let canvas = (dst_w as u32, dst_h as u32);
            if src_r > dst_r {
                dst_y = position.y_offset(dst_h, fit_h);
                dst_h = fit_h;
            } else if src_r < dst_r {
                dst_x = position.x_offset(dst_w, fit_w);
                dst_w = fit_w;
            }
            return Ok(ScalePlan {
                mode,
                canvas,
                src: Rect::new(0, 0, src_w, src_h),
                dst: Rect::new(dst_x, dst_y, dst_w, dst_h),
            });
        }
        ScaleMode::Carve => {
            if src_r > dst_r {
                dst_w = fit_w;
            } else if src_r < dst_r {
                dst_h = fit_h;
            }
        }
    }

    Ok(ScalePlan {
        mode,
        canvas: (dst_w as u32, dst_h as u32),
        src: Rect::new(src_x, src_y, src_w, src_h),
        dst: Rect::new(0, 0, dst_w, dst_h),
    })
}

/// Write `argb` at (x, y), compositing when `blend` is set. Coordinates
/// outside the canvas are ignored.
#[inline]
fn put(dst: &mut PixMut, x: i32, y: i32, argb: u32, blend: bool) {
    if !dst.bounds_safe(x as i64, y as i64) {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    let value = if blend {
        alpha_blend(dst.get_argb_unchecked(x, y), argb)
    } else {
        argb
    };
    dst.set_argb_unchecked(x, y, value);
}

/// Copy `src_rect` of a truecolor source to `dst` at (dx, dy) unscaled.
fn copy_rect(dst: &mut PixMut, src: &Pix, src_rect: Rect, dx: i32, dy: i32, blend: bool) {
    for y in 0..src_rect.h {
        for x in 0..src_rect.w {
            let (sx, sy) = (src_rect.x + x, src_rect.y + y);
            if src.bounds_safe(sx as i64, sy as i64) {
                let argb = src.get_argb_unchecked(sx as u32, sy as u32);
                put(dst, dx + x, dy + y, argb, blend);
            }
        }
    }
}

/// First tile origin along one axis. Partial tiles go to the far edge
/// for head placement, to the near edge for tail placement and are split
/// evenly for centered placement.
fn tile_start(target: i32, length: i32, placed: i32, tail: bool, body: bool) -> i32 {
    if target <= length {
        placed
    } else if tail {
        target % length - length
    } else if body {
        (target % length) / 2 - length
    } else {
        0
    }
}

/// Repeat a truecolor source over the whole canvas.
fn tile_copy(dst: &mut PixMut, src: &Pix, position: Position, blend: bool) {
    use pixkit_core::{Align, VAlign};

    let (dw, dh) = (dst.width() as i32, dst.height() as i32);
    let (sw, sh) = (src.width() as i32, src.height() as i32);
    let x0 = tile_start(
        dw,
        sw,
        position.x_offset(dw, sw),
        position.h == Align::Right,
        position.h == Align::Center,
    );
    let y0 = tile_start(
        dh,
        sh,
        position.y_offset(dh, sh),
        position.v == VAlign::Bottom,
        position.v == VAlign::Middle,
    );
    debug!(x0, y0, "tile origin");
    for y in 0..dh {
        let sy = (y - y0).rem_euclid(sh) as u32;
        for x in 0..dw {
            let sx = (x - x0).rem_euclid(sw) as u32;
            put(dst, x, y, src.get_argb_unchecked(sx, sy), blend);
        }
    }
}

/// Area-average `src_rect` of a truecolor source into `dst_rect`.
fn resample(dst: &mut PixMut, src: &Pix, src_rect: Rect, dst_rect: Rect, blend: bool) {
    let max_alpha = MAX_ALPHA as f64;
    let scale_x = src_rect.w as f64 / dst_rect.w as f64;
    let scale_y = src_rect.h as f64 / dst_rect.h as f64;
    let (src_w, src_h) = (src.width() as f64, src.height() as f64);

    for dy in 0..dst_rect.h {
        let y0 = (src_rect.y as f64 + dy as f64 * scale_y).max(0.0);
        let y1 = (src_rect.y as f64 + (dy + 1) as f64 * scale_y).min(src_h);
        for dx in 0..dst_rect.w {
            let x0 = (src_rect.x as f64 + dx as f64 * scale_x).max(0.0);
            let x1 = (src_rect.x as f64 + (dx + 1) as f64 * scale_x).min(src_w);

            let (mut r, mut g, mut b) = (0.0, 0.0, 0.0);
            let (mut alpha, mut opacity, mut area) = (0.0, 0.0, 0.0);
            let mut sy = y0.floor();
            while sy < y1 {
                let wy = y1.min(sy + 1.0) - y0.max(sy);
                let mut sx = x0.floor();
                while sx < x1 {
                    let wx = x1.min(sx + 1.0) - x0.max(sx);
                    let weight = wx * wy;
                    let (pr, pg, pb, pa) =
                        color::extract_argb(src.get_argb_unchecked(sx as u32, sy as u32));
                    let visible = (max_alpha - pa as f64) * weight;
                    r += pr as f64 * visible;
                    g += pg as f64 * visible;
                    b += pb as f64 * visible;
                    alpha += pa as f64 * weight;
                    opacity += visible;
                    area += weight;
                    sx += 1.0;
                }
                sy += 1.0;
            }
            if area <= 0.0 {
                continue;
            }

            let a = (alpha / area).round().min(max_alpha) as u8;
            let argb = if opacity > 0.0 {
                let channel = |v: f64| (v / opacity).round().clamp(0.0, 255.0) as u8;
                color::compose_argb(channel(r), channel(g), channel(b), a)
            } else {
                color::compose_argb(0, 0, 0, ALPHA_TRANSPARENT)
            };
            put(dst, dst_rect.x + dx, dst_rect.y + dy, argb, blend);
        }
    }
}

/// Scale an image to `width` x `height` under `mode`.
///
/// The result is always a new truecolor image. When
/// `options.background` resolves, the canvas is filled with it first and
/// the source is composited over it; otherwise source pixels replace the
/// opaque black canvas. A background that fails to resolve is skipped
/// with a warning. [`ScaleMode::Carve`] uses the built-in
/// [`EnergyCarver`].
///
/// # Errors
///
/// Returns [`TransformError::InvalidDimensions`] for a target dimension
/// below 1 and carving errors in carve mode.
///
/// # Examples
///
/// ```
/// use pixkit_core::Pix;
/// use pixkit_transform::{ScaleMode, ScaleOptions, scale};
///
/// let pix = Pix::new_truecolor(100, 50).unwrap();
/// let out = scale(&pix, 50, 50, ScaleMode::Fit, &ScaleOptions::default()).unwrap();
/// assert_eq!((out.width(), out.height()), (50, 25));
/// ```
pub fn scale(
    src: &Pix,
    width: u32,
    height: u32,
    mode: ScaleMode,
    options: &ScaleOptions,
) -> TransformResult<Pix> {
    scale_with_carver(src, width, height, mode, options, &EnergyCarver)
}

/// [`scale`] with a caller-provided seam carver for [`ScaleMode::Carve`].
pub fn scale_with_carver(
    src: &Pix,
    width: u32,
    height: u32,
    mode: ScaleMode,
    options: &ScaleOptions,
    carver: &dyn SeamCarver,
) -> TransformResult<Pix> {
    let plan = plan(
        src.width(),
        src.height(),
        width,
        height,
        mode,
        options.position,
    )?;
    debug!(
        mode = ?plan.mode,
        canvas_w = plan.canvas.0,
        canvas_h = plan.canvas.1,
        src = ?plan.src,
        dst = ?plan.dst,
        "scale plan"
    );
    if plan.mode == ScaleMode::Carve {
        options.carve.validate()?;
    }

    let source = src.to_truecolor()?;
    let mut dst = PixMut::new_truecolor(plan.canvas.0, plan.canvas.1)?;
    dst.set_save_alpha(src.save_alpha());

    let mut blend = false;
    if let Some(spec) = &options.background {
        match fetch_color(spec, Some(src)) {
            Ok(argb) => {
                dst.fill(argb);
                blend = true;
            }
            Err(e) => warn!("ignoring background color: {e}"),
        }
    }

    match plan.mode {
        ScaleMode::None | ScaleMode::Crop => {
            copy_rect(&mut dst, &source, plan.src, plan.dst.x, plan.dst.y, blend);
        }
        ScaleMode::Tile => tile_copy(&mut dst, &source, options.position, blend),
        _ => resample(&mut dst, &source, plan.src, plan.dst, blend),
    }

    let out: Pix = dst.into();
    if plan.mode == ScaleMode::Carve {
        return carve(&out, width, height, &options.carve, carver);
    }
    Ok(out)
}
