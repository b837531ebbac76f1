//! Web-safe palette conversion
//!
//! Rewrites an image as an indexed image over the 216-color web-safe cube
//! (each channel one of 0, 51, 102, 153, 204, 255). Index `i` holds
//! `r = i / 36`, `g = i / 6 % 6` and `b = i % 6` in cube steps.
//!
//! With dithering the quantization error of each pixel is diffused to its
//! neighbors:
//!
//! ```text
//!        X   5
//!    3   5   3
//! ```
//!
//! (weights in sixteenths).

use crate::error::ColorResult;
use pixkit_core::color::{self, ALPHA_TRANSPARENT};
use pixkit_core::{Palette, PaletteEntry, PixMut};

/// Number of levels per channel
const LEVELS: u32 = 6;
/// Distance between adjacent levels
const STEP: u32 = 51;

/// Build the 216-entry web-safe palette.
pub fn websafe_palette() -> ColorResult<Palette> {
    let mut pal = Palette::new();
    for r in 0..LEVELS {
        for g in 0..LEVELS {
            for b in 0..LEVELS {
                pal.push(PaletteEntry::rgb(
                    (r * STEP) as u8,
                    (g * STEP) as u8,
                    (b * STEP) as u8,
                ))?;
            }
        }
    }
    Ok(pal)
}

/// Nearest cube level of a channel value.
#[inline]
fn level(v: f32) -> u32 {
    ((v.clamp(0.0, 255.0) + 25.5) / STEP as f32) as u32
}

#[inline]
fn cube_index(r: u32, g: u32, b: u32) -> u8 {
    (r * LEVELS * LEVELS + g * LEVELS + b) as u8
}

/// Convert `image` to the web-safe palette in place.
///
/// Truecolor and indexed sources are both accepted; indexed pixels are
/// read through their palette. Alpha is dropped.
pub fn to_websafe(image: &mut PixMut, dither: bool) -> ColorResult<()> {
    let (width, height) = (image.width(), image.height());
    let mut out = PixMut::new_indexed(width, height, websafe_palette()?)?;
    let (w, h) = (width as usize, height as usize);
    let mut error = if dither {
        vec![[0.0f32; 3]; w * h]
    } else {
        Vec::new()
    };

    for y in 0..h {
        for x in 0..w {
            let argb = image
                .get_argb(x as u32, y as u32)
                .unwrap_or(color::compose_argb(0, 0, 0, ALPHA_TRANSPARENT));
            let (r, g, b) = color::extract_rgb(argb);
            let mut value = [r as f32, g as f32, b as f32];
            if dither {
                let e = error[y * w + x];
                for (v, e) in value.iter_mut().zip(e) {
                    *v = (*v + e).clamp(0.0, 255.0);
                }
            }
            let q = value.map(level);
            out.set_index_unchecked(x as u32, y as u32, cube_index(q[0], q[1], q[2]));

            if dither {
                let diff: [f32; 3] = std::array::from_fn(|i| value[i] - (q[i] * STEP) as f32);
                let mut spread = |dx: isize, dy: usize, weight: f32| {
                    let nx = x as isize + dx;
                    let ny = y + dy;
                    if nx < 0 || nx as usize >= w || ny >= h {
                        return;
                    }
                    let cell = &mut error[ny * w + nx as usize];
                    for (c, d) in cell.iter_mut().zip(diff) {
                        *c += d * weight;
                    }
                };
                spread(1, 0, 5.0 / 16.0);
                spread(-1, 1, 3.0 / 16.0);
                spread(0, 1, 5.0 / 16.0);
                spread(1, 1, 3.0 / 16.0);
            }
        }
    }

    *image = out;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_layout() {
        let pal = websafe_palette().unwrap();
        assert_eq!(pal.len(), 216);
        assert_eq!(pal.get(0).unwrap().argb(), 0);
        assert_eq!(pal.get(215).unwrap().argb(), 0x00ff_ffff);
        let e = pal.get(cube_index(1, 2, 3)).unwrap();
        assert_eq!((e.red, e.green, e.blue), (51, 102, 153));
    }

    #[test]
    fn test_level_rounding() {
        assert_eq!(level(0.0), 0);
        assert_eq!(level(25.0), 0);
        assert_eq!(level(26.0), 1);
        assert_eq!(level(255.0), 5);
        assert_eq!(level(300.0), 5);
    }

    #[test]
    fn test_to_websafe_plain() {
        let mut pm = PixMut::new_truecolor(2, 1).unwrap();
        pm.set_argb_unchecked(0, 0, color::compose_rgb(250, 100, 10));
        pm.set_argb_unchecked(1, 0, color::compose_argb(51, 51, 51, 100));
        to_websafe(&mut pm, false).unwrap();
        assert!(!pm.is_truecolor());
        assert_eq!(pm.get_argb(0, 0), Some(color::compose_rgb(255, 102, 0)));
        assert_eq!(pm.get_argb(1, 0), Some(color::compose_rgb(51, 51, 51)));
    }

    #[test]
    fn test_to_websafe_dither_mixes_levels() {
        // 25 sits just below the midpoint between 0 and 51
        let mut pm = PixMut::new_truecolor(8, 8).unwrap();
        pm.fill(color::compose_rgb(25, 25, 25));
        to_websafe(&mut pm, true).unwrap();
        let lit = (0..8)
            .flat_map(|y| (0..8).map(move |x| (x, y)))
            .filter(|&(x, y)| pm.get_index_unchecked(x, y) != 0)
            .count();
        assert!(lit > 0 && lit < 64, "lit = {lit}");

        let mut plain = PixMut::new_truecolor(8, 8).unwrap();
        plain.fill(color::compose_rgb(25, 25, 25));
        to_websafe(&mut plain, false).unwrap();
        assert!(plain.data().iter().all(|&v| v == 0));
    }
}
