//! Synthetic test images
//!
//! All fixtures are deterministic so regression tests can assert exact
//! pixel values.

use crate::error::{TestError, TestResult};
use pixkit_core::color::compose_argb;
use pixkit_core::{Palette, PaletteEntry, Pix, PixMut};

fn fixture<T>(name: &'static str, r: pixkit_core::Result<T>) -> TestResult<T> {
    r.map_err(|source| TestError::Fixture { name, source })
}

/// Truecolor image whose red channel grows left to right and green
/// channel top to bottom. Blue is constant and alpha is opaque.
pub fn gradient(width: u32, height: u32, blue: u8) -> TestResult<Pix> {
    let mut pm = fixture("gradient", PixMut::new_truecolor(width, height))?;
    let sx = 255 / width.saturating_sub(1).max(1);
    let sy = 255 / height.saturating_sub(1).max(1);
    for y in 0..height {
        for x in 0..width {
            let r = (x * sx).min(255) as u8;
            let g = (y * sy).min(255) as u8;
            pm.set_argb_unchecked(x, y, compose_argb(r, g, blue, 0));
        }
    }
    Ok(pm.into())
}

/// Truecolor image with alpha growing left to right from opaque to
/// fully transparent over a constant color.
pub fn alpha_ramp(width: u32, height: u32, rgb: (u8, u8, u8)) -> TestResult<Pix> {
    let mut pm = fixture("alpha_ramp", PixMut::new_truecolor(width, height))?;
    let last = width.saturating_sub(1).max(1);
    for y in 0..height {
        for x in 0..width {
            let a = (x * 127 / last).min(127) as u8;
            pm.set_argb_unchecked(x, y, compose_argb(rgb.0, rgb.1, rgb.2, a));
        }
    }
    pm.set_save_alpha(true);
    Ok(pm.into())
}

/// Indexed image over the 256-entry black-to-white gray palette whose
/// index equals `(x + y) % 256`.
pub fn gray_indexed(width: u32, height: u32) -> TestResult<Pix> {
    let pal = fixture("gray_indexed", Palette::linear_gray(256, true))?;
    let mut pm = fixture("gray_indexed", PixMut::new_indexed(width, height, pal))?;
    for y in 0..height {
        for x in 0..width {
            pm.set_index_unchecked(x, y, ((x + y) % 256) as u8);
        }
    }
    Ok(pm.into())
}

/// Two-color indexed checkerboard with `cell`-pixel squares. Index 0 is
/// `a` and covers the top-left cell.
pub fn checkerboard(width: u32, height: u32, cell: u32, a: u32, b: u32) -> TestResult<Pix> {
    let mut pal = Palette::new();
    for argb in [a, b] {
        let entry = PaletteEntry::new(
            (argb >> 16) as u8,
            (argb >> 8) as u8,
            argb as u8,
            ((argb >> 24) & 0x7f) as u8,
        );
        fixture("checkerboard", pal.push(entry))?;
    }
    let mut pm = fixture("checkerboard", PixMut::new_indexed(width, height, pal))?;
    let cell = cell.max(1);
    for y in 0..height {
        for x in 0..width {
            pm.set_index_unchecked(x, y, ((x / cell + y / cell) % 2) as u8);
        }
    }
    Ok(pm.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_corners() {
        let pix = gradient(4, 4, 9).unwrap();
        assert_eq!(pix.get_argb(0, 0), Some(compose_argb(0, 0, 9, 0)));
        assert_eq!(pix.get_argb(3, 3), Some(compose_argb(255, 255, 9, 0)));
    }

    #[test]
    fn test_alpha_ramp_ends() {
        let pix = alpha_ramp(3, 1, (1, 2, 3)).unwrap();
        assert_eq!(pix.get_argb(0, 0), Some(compose_argb(1, 2, 3, 0)));
        assert_eq!(pix.get_argb(2, 0), Some(compose_argb(1, 2, 3, 127)));
        assert!(pix.save_alpha());
    }

    #[test]
    fn test_checkerboard_cells() {
        let pix = checkerboard(4, 4, 2, 0x00ff_0000, 0x0000_00ff).unwrap();
        assert_eq!(pix.get_index_unchecked(0, 0), 0);
        assert_eq!(pix.get_index_unchecked(2, 0), 1);
        assert_eq!(pix.get_index_unchecked(2, 2), 0);
        assert_eq!(pix.get_argb(3, 1), Some(0x0000_00ff));
    }
}
