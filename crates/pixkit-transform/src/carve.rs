//! Content-aware resizing (seam carving)
//!
//! A seam is a connected path of pixels, one per row, running from the top
//! of the image to the bottom. Narrowing removes the seams that cross the
//! least image detail; widening duplicates them. Height changes run the
//! same process on the transposed image.
//!
//! The actual carving is a pluggable collaborator behind [`SeamCarver`];
//! [`EnergyCarver`] is the built-in implementation.

use crate::{TransformError, TransformResult};
use pixkit_core::color::{self, alpha_to_gray, gray_to_alpha};
use pixkit_core::{Pix, PixMut};
use tracing::{debug, warn};

/// Seam-carving parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarveOptions {
    /// Largest sideways step a seam may take between rows; 0 keeps seams
    /// straight
    pub max_step: i32,
    /// Extra cost per pixel of sideways step
    pub rigidity: f64,
    /// Resize the height before the width
    pub vertical_first: bool,
    /// Carry alpha through the carver; otherwise the result is opaque
    pub save_alpha: bool,
}

impl Default for CarveOptions {
    fn default() -> Self {
        Self {
            max_step: 1,
            rigidity: 0.0,
            vertical_first: false,
            save_alpha: false,
        }
    }
}

impl CarveOptions {
    pub fn with_max_step(mut self, max_step: i32) -> Self {
        self.max_step = max_step;
        self
    }

    pub fn with_rigidity(mut self, rigidity: f64) -> Self {
        self.rigidity = rigidity;
        self
    }

    pub fn with_vertical_first(mut self, vertical_first: bool) -> Self {
        self.vertical_first = vertical_first;
        self
    }

    pub fn with_save_alpha(mut self, save_alpha: bool) -> Self {
        self.save_alpha = save_alpha;
        self
    }

    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidParameters`] for a negative
    /// `max_step` or a rigidity that is negative or not finite.
    pub fn validate(&self) -> TransformResult<()> {
        let problem = if self.max_step < 0 {
            Some("'max_step' must not be a negative number")
        } else if !self.rigidity.is_finite() {
            Some("'rigidity' must be a finite number")
        } else if self.rigidity < 0.0 {
            Some("'rigidity' must not be a negative number")
        } else {
            None
        };
        match problem {
            Some(msg) => {
                warn!("{msg}");
                Err(TransformError::InvalidParameters(msg.to_string()))
            }
            None => Ok(()),
        }
    }
}

/// A content-aware resize implementation
pub trait SeamCarver {
    /// Resize `image` to exactly `width` x `height`, returning a new
    /// truecolor image.
    fn resize(
        &self,
        image: &Pix,
        width: u32,
        height: u32,
        options: &CarveOptions,
    ) -> TransformResult<Pix>;
}

/// Built-in seam carver using gradient energy and dynamic programming
#[derive(Debug, Clone, Copy, Default)]
pub struct EnergyCarver;

/// Working image: RGBA with 0-255 opacity, row-major
#[derive(Debug, Clone)]
struct Grid {
    width: usize,
    height: usize,
    pixels: Vec<[u8; 4]>,
}

impl Grid {
    fn from_pix(pix: &Pix, save_alpha: bool) -> TransformResult<Self> {
        let pix = pix.to_truecolor()?;
        let pixels = pix
            .data()
            .iter()
            .map(|&argb| {
                let (r, g, b, a) = color::extract_argb(argb);
                let opacity = if save_alpha { alpha_to_gray(a) } else { 255 };
                [r, g, b, opacity]
            })
            .collect();
        Ok(Self {
            width: pix.width() as usize,
            height: pix.height() as usize,
            pixels,
        })
    }

    fn into_pix(self, save_alpha: bool) -> TransformResult<Pix> {
        let mut out = PixMut::new_truecolor(self.width as u32, self.height as u32)?;
        for (dst, [r, g, b, o]) in out.data_mut().iter_mut().zip(self.pixels) {
            *dst = color::compose_argb(r, g, b, gray_to_alpha(o));
        }
        out.set_save_alpha(save_alpha);
        Ok(out.into())
    }

    fn transpose(&self) -> Self {
        let mut pixels = Vec::with_capacity(self.pixels.len());
        for x in 0..self.width {
            for y in 0..self.height {
                pixels.push(self.pixels[y * self.width + x]);
            }
        }
        Self {
            width: self.height,
            height: self.width,
            pixels,
        }
    }

    /// Luminance weighted by opacity, so transparent areas carve first.
    fn luma(&self) -> Vec<f64> {
        self.pixels
            .iter()
            .map(|&[r, g, b, o]| color::rgb_to_gray(r, g, b) as f64 * o as f64 / 255.0 + o as f64)
            .collect()
    }

    /// Sum of absolute differences to the four neighbors, edges clamped.
    fn energy(&self) -> Vec<f64> {
        let (w, h) = (self.width, self.height);
        let luma = self.luma();
        let mut energy = vec![0.0; w * h];
        for y in 0..h {
            let up = y.saturating_sub(1);
            let down = (y + 1).min(h - 1);
            for x in 0..w {
                let left = x.saturating_sub(1);
                let right = (x + 1).min(w - 1);
                let here = luma[y * w + x];
                energy[y * w + x] = (here - luma[y * w + left]).abs()
                    + (here - luma[y * w + right]).abs()
                    + (here - luma[up * w + x]).abs()
                    + (here - luma[down * w + x]).abs();
            }
        }
        energy
    }

    /// Lowest-cost seam as one x coordinate per row.
    fn find_seam(&self, options: &CarveOptions) -> Vec<usize> {
        let (w, h) = (self.width, self.height);
        let step = options.max_step.max(0) as usize;
        let mut cost = self.energy();
        let mut from = vec![0usize; w * h];
        for y in 1..h {
            for x in 0..w {
                let lo = x.saturating_sub(step);
                let hi = x.saturating_add(step).min(w - 1);
                let (best, best_cost) = (lo..=hi)
                    .map(|px| {
                        let penalty = options.rigidity * px.abs_diff(x) as f64;
                        (px, cost[(y - 1) * w + px] + penalty)
                    })
                    .fold((x, f64::INFINITY), |acc, c| if c.1 < acc.1 { c } else { acc });
                cost[y * w + x] += best_cost;
                from[y * w + x] = best;
            }
        }

        let last = &cost[(h - 1) * w..];
        let mut x = (0..w)
            .fold((0, f64::INFINITY), |acc, i| {
                if last[i] < acc.1 { (i, last[i]) } else { acc }
            })
            .0;
        let mut seam = vec![0; h];
        for y in (0..h).rev() {
            seam[y] = x;
            x = from[y * w + x];
        }
        seam
    }

    fn remove_seam(&mut self, seam: &[usize]) {
        let w = self.width;
        let mut pixels = Vec::with_capacity(self.pixels.len() - self.height);
        for (y, &sx) in seam.iter().enumerate() {
            let row = &self.pixels[y * w..(y + 1) * w];
            pixels.extend_from_slice(&row[..sx]);
            pixels.extend_from_slice(&row[sx + 1..]);
        }
        self.pixels = pixels;
        self.width -= 1;
    }

    fn narrow(&mut self, width: usize, options: &CarveOptions) {
        while self.width > width {
            let seam = self.find_seam(options);
            self.remove_seam(&seam);
        }
    }

    /// Insert `count` duplicated seams, at most one per column per row.
    fn widen_by(&mut self, count: usize, options: &CarveOptions) {
        let (w, h) = (self.width, self.height);
        let mut scratch = self.clone();
        // source column of every scratch pixel
        let mut origin: Vec<usize> = (0..h).flat_map(|_| 0..w).collect();
        let mut marked = vec![false; w * h];
        for _ in 0..count {
            let seam = scratch.find_seam(options);
            let sw = scratch.width;
            let mut kept = Vec::with_capacity(origin.len() - h);
            for (y, &sx) in seam.iter().enumerate() {
                marked[y * w + origin[y * sw + sx]] = true;
                let row = &origin[y * sw..(y + 1) * sw];
                kept.extend_from_slice(&row[..sx]);
                kept.extend_from_slice(&row[sx + 1..]);
            }
            origin = kept;
            scratch.remove_seam(&seam);
        }

        let mut pixels = Vec::with_capacity((w + count) * h);
        for y in 0..h {
            let row = &self.pixels[y * w..(y + 1) * w];
            for x in 0..w {
                pixels.push(row[x]);
                if marked[y * w + x] {
                    let next = row[(x + 1).min(w - 1)];
                    let mut mid = [0u8; 4];
                    for c in 0..4 {
                        mid[c] = ((row[x][c] as u16 + next[c] as u16 + 1) / 2) as u8;
                    }
                    pixels.push(mid);
                }
            }
        }
        self.pixels = pixels;
        self.width = w + count;
    }

    fn resize_width(&mut self, width: usize, options: &CarveOptions) {
        if width < self.width {
            self.narrow(width, options);
        }
        // every pass can at most double the width
        while width > self.width {
            let count = (width - self.width).min(self.width);
            self.widen_by(count, options);
        }
    }
}

impl SeamCarver for EnergyCarver {
    fn resize(
        &self,
        image: &Pix,
        width: u32,
        height: u32,
        options: &CarveOptions,
    ) -> TransformResult<Pix> {
        let mut grid = Grid::from_pix(image, options.save_alpha)?;
        let (w, h) = (width as usize, height as usize);
        if options.vertical_first {
            let mut t = grid.transpose();
            t.resize_width(h, options);
            grid = t.transpose();
            grid.resize_width(w, options);
        } else {
            grid.resize_width(w, options);
            let mut t = grid.transpose();
            t.resize_width(h, options);
            grid = t.transpose();
        }
        grid.into_pix(options.save_alpha)
    }
}

/// Resize an image to `width` x `height` with a seam carver.
///
/// The options are validated before the carver runs.
///
/// # Errors
///
/// Returns [`TransformError::InvalidDimensions`] when either size is 0,
/// [`TransformError::InvalidParameters`] for invalid options and whatever
/// the carver reports.
pub fn carve(
    image: &Pix,
    width: u32,
    height: u32,
    options: &CarveOptions,
    carver: &dyn SeamCarver,
) -> TransformResult<Pix> {
    if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
        warn!(width, height, "invalid image dimensions");
        return Err(TransformError::InvalidDimensions {
            width: width as i64,
            height: height as i64,
        });
    }
    options.validate()?;
    debug!(
        from_width = image.width(),
        from_height = image.height(),
        width,
        height,
        "carving"
    );
    let out = carver.resize(image, width, height, options)?;
    if out.width() != width || out.height() != height {
        return Err(TransformError::Carve(format!(
            "carver returned {}x{} for a {}x{} request",
            out.width(),
            out.height(),
            width,
            height
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixkit_core::color::{compose_argb, compose_rgb};

    /// Flat image with a bright vertical stripe at column `stripe`.
    fn striped(width: u32, height: u32, stripe: u32) -> Pix {
        let mut pm = PixMut::new_truecolor(width, height).unwrap();
        pm.fill(compose_rgb(20, 20, 20));
        for y in 0..height {
            pm.set_argb_unchecked(stripe, y, compose_rgb(250, 250, 250));
        }
        pm.into()
    }

    #[test]
    fn test_options_validate() {
        assert!(CarveOptions::default().validate().is_ok());
        assert!(CarveOptions::default().with_max_step(-1).validate().is_err());
        assert!(CarveOptions::default().with_rigidity(-0.5).validate().is_err());
        assert!(CarveOptions::default().with_rigidity(f64::NAN).validate().is_err());
        assert!(CarveOptions::default().with_rigidity(f64::INFINITY).validate().is_err());
        assert!(CarveOptions::default().with_max_step(0).validate().is_ok());
    }

    #[test]
    fn test_narrow_keeps_stripe() {
        let pix = striped(12, 6, 5);
        let out = carve(&pix, 8, 6, &CarveOptions::default(), &EnergyCarver).unwrap();
        assert_eq!((out.width(), out.height()), (8, 6));
        for y in 0..6 {
            let bright = (0..8).filter(|&x| color::red(out.get_argb_unchecked(x, y)) == 250);
            assert_eq!(bright.count(), 1, "row {y}");
        }
    }

    #[test]
    fn test_widen_and_heighten() {
        let pix = striped(5, 4, 2);
        let out = carve(&pix, 9, 7, &CarveOptions::default(), &EnergyCarver).unwrap();
        assert_eq!((out.width(), out.height()), (9, 7));
        let out = carve(
            &pix,
            12,
            3,
            &CarveOptions::default().with_vertical_first(true),
            &EnergyCarver,
        )
        .unwrap();
        assert_eq!((out.width(), out.height()), (12, 3));
    }

    #[test]
    fn test_straight_seams() {
        let pix = striped(6, 5, 3);
        let opts = CarveOptions::default().with_max_step(0);
        let out = carve(&pix, 3, 5, &opts, &EnergyCarver).unwrap();
        // straight seams remove whole columns, so every row is identical
        for y in 1..5 {
            for x in 0..3 {
                assert_eq!(out.get_argb_unchecked(x, y), out.get_argb_unchecked(x, 0));
            }
        }
    }

    #[test]
    fn test_alpha_handling() {
        let mut pm = PixMut::new_truecolor(4, 2).unwrap();
        pm.fill(compose_argb(9, 9, 9, 127));
        let pix: Pix = pm.into();

        let opaque = carve(&pix, 3, 2, &CarveOptions::default(), &EnergyCarver).unwrap();
        assert_eq!(color::alpha(opaque.get_argb_unchecked(0, 0)), 0);
        assert!(!opaque.save_alpha());

        let opts = CarveOptions::default().with_save_alpha(true);
        let kept = carve(&pix, 3, 2, &opts, &EnergyCarver).unwrap();
        assert_eq!(color::alpha(kept.get_argb_unchecked(0, 0)), 127);
        assert!(kept.save_alpha());
    }

    #[test]
    fn test_invalid_requests() {
        let pix = striped(4, 4, 1);
        assert!(matches!(
            carve(&pix, 0, 4, &CarveOptions::default(), &EnergyCarver),
            Err(TransformError::InvalidDimensions { .. })
        ));
        let bad = CarveOptions::default().with_max_step(-3);
        assert!(matches!(
            carve(&pix, 2, 2, &bad, &EnergyCarver),
            Err(TransformError::InvalidParameters(_))
        ));
    }
}
