//! Channel sampling
//!
//! A [`Channel`] wraps an optional source image together with an offset and
//! reads it as a single 8-bit plane. The way pixels turn into intensities
//! is chosen once per image:
//!
//! - truecolor images use the luma of each pixel
//! - palette images use the luma of the palette entry
//! - gray ramp palettes use the entry's green value, or the index itself
//!   for the 256-level black-to-white ramp
//!
//! An absent image reads as intensity 0 and, when sampled as alpha, as
//! fully opaque.

use pixkit_core::color::{self, MAX_ALPHA};
use pixkit_core::{GrayRamp, Pix};

/// Pixel to intensity conversion selected for a source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Zero,
    TrueColor,
    Palette,
    GrayScale,
    GrayIndex,
}

impl Source {
    fn for_image(pix: Option<&Pix>) -> Self {
        let Some(pix) = pix else {
            return Source::Zero;
        };
        match pix.palette() {
            None => Source::TrueColor,
            Some(pal) => match pal.gray_ramp() {
                None => Source::Palette,
                Some(GrayRamp::BlackToWhite8) => Source::GrayIndex,
                Some(_) => Source::GrayScale,
            },
        }
    }
}

/// A single-plane view of an image placed at an offset
#[derive(Debug, Clone, Copy)]
pub struct Channel<'a> {
    pix: Option<&'a Pix>,
    source: Source,
    x_offset: i32,
    y_offset: i32,
}

impl<'a> Channel<'a> {
    /// Create a channel over `pix`, whose top-left corner sits at
    /// (`x_offset`, `y_offset`) in sampling coordinates.
    pub fn new(pix: Option<&'a Pix>, x_offset: i32, y_offset: i32) -> Self {
        Self {
            pix,
            source: Source::for_image(pix),
            x_offset,
            y_offset,
        }
    }

    /// Width of the source image, 0 when absent.
    pub fn width(&self) -> u32 {
        self.pix.map_or(0, |p| p.width())
    }

    /// Height of the source image, 0 when absent.
    pub fn height(&self) -> u32 {
        self.pix.map_or(0, |p| p.height())
    }

    pub fn is_present(&self) -> bool {
        self.pix.is_some()
    }

    pub fn offset(&self) -> (i32, i32) {
        (self.x_offset, self.y_offset)
    }

    /// Intensity at (x, y) in sampling coordinates, or `default` outside
    /// the source.
    pub fn sample_intensity(&self, x: i32, y: i32, default: u8) -> u8 {
        let Some(pix) = self.pix else {
            return 0;
        };
        let x = x as i64 - self.x_offset as i64;
        let y = y as i64 - self.y_offset as i64;
        if !pix.bounds_safe(x, y) {
            return default;
        }
        let (x, y) = (x as u32, y as u32);
        let entry = |i: u8| pix.palette().and_then(|pal| pal.get(i).copied());
        match self.source {
            Source::Zero => 0,
            Source::TrueColor => {
                let (r, g, b) = color::extract_rgb(pix.get_argb_unchecked(x, y));
                color::rgb_to_gray(r, g, b)
            }
            Source::Palette => entry(pix.get_index_unchecked(x, y))
                .map_or(0, |e| color::rgb_to_gray(e.red, e.green, e.blue)),
            Source::GrayScale => entry(pix.get_index_unchecked(x, y)).map_or(0, |e| e.green),
            Source::GrayIndex => pix.get_index_unchecked(x, y),
        }
    }

    /// Alpha at (x, y).
    ///
    /// With `raw` the intensity is taken as the alpha value and clamped to
    /// 0..=127, `default` included. Otherwise white maps to opaque and
    /// `default` is returned unchanged outside the source.
    pub fn sample_alpha(&self, x: i32, y: i32, default: u8, raw: bool) -> u8 {
        if self.pix.is_none() {
            return color::ALPHA_OPAQUE;
        }
        if raw {
            return self.sample_intensity(x, y, default).min(MAX_ALPHA);
        }
        if !self.contains(x, y) {
            return default;
        }
        color::gray_to_alpha(self.sample_intensity(x, y, 0))
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        self.pix.is_some_and(|p| {
            p.bounds_safe(
                x as i64 - self.x_offset as i64,
                y as i64 - self.y_offset as i64,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixkit_core::{Palette, PaletteEntry, PixMut};

    fn gray_image(values: &[u8], width: u32) -> Pix {
        let height = values.len() as u32 / width;
        let pal = Palette::linear_gray(256, true).unwrap();
        let mut pm = PixMut::new_indexed(width, height, pal).unwrap();
        for (i, v) in values.iter().enumerate() {
            pm.set_index_unchecked(i as u32 % width, i as u32 / width, *v);
        }
        pm.into()
    }

    #[test]
    fn test_absent_channel() {
        let ch = Channel::new(None, 0, 0);
        assert_eq!(ch.width(), 0);
        assert_eq!(ch.sample_intensity(3, 3, 99), 0);
        assert_eq!(ch.sample_alpha(3, 3, 127, false), 0);
        assert_eq!(ch.sample_alpha(3, 3, 127, true), 0);
    }

    #[test]
    fn test_truecolor_intensity_and_offset() {
        let mut pm = PixMut::new_truecolor(2, 1).unwrap();
        pm.set_argb_unchecked(1, 0, color::compose_rgb(255, 255, 255));
        let pix: Pix = pm.into();
        let ch = Channel::new(Some(&pix), 5, 0);
        assert_eq!(ch.sample_intensity(5, 0, 7), 0);
        assert_eq!(ch.sample_intensity(6, 0, 7), 255);
        assert_eq!(ch.sample_intensity(0, 0, 7), 7);
        assert_eq!(ch.sample_alpha(6, 0, 127, false), 0);
        assert_eq!(ch.sample_alpha(5, 0, 127, false), 127);
        assert_eq!(ch.sample_alpha(9, 0, 100, false), 100);
    }

    #[test]
    fn test_gray_index_source() {
        let pix = gray_image(&[0, 64, 200, 255], 2);
        let ch = Channel::new(Some(&pix), 0, 0);
        assert_eq!(ch.sample_intensity(1, 0, 0), 64);
        assert_eq!(ch.sample_intensity(0, 1, 0), 200);
        assert_eq!(ch.sample_alpha(1, 0, 0, true), 64);
        assert_eq!(ch.sample_alpha(0, 1, 0, true), 127);
        assert_eq!(ch.sample_alpha(-1, 0, 200, true), 127);
    }

    #[test]
    fn test_descending_ramp_uses_green() {
        let pal = Palette::linear_gray(16, false).unwrap();
        let mut pm = PixMut::new_indexed(1, 1, pal).unwrap();
        pm.set_index_unchecked(0, 0, 1);
        let pix: Pix = pm.into();
        assert_eq!(Channel::new(Some(&pix), 0, 0).sample_intensity(0, 0, 0), 238);
    }

    #[test]
    fn test_palette_source_uses_luma() {
        let mut pal = Palette::new();
        pal.push(PaletteEntry::rgb(255, 0, 0)).unwrap();
        let pix = Pix::new_indexed(1, 1, pal).unwrap();
        let ch = Channel::new(Some(&pix), 0, 0);
        assert_eq!(ch.sample_intensity(0, 0, 0), 76);
        assert_eq!(ch.sample_alpha(0, 0, 0, false), color::gray_to_alpha(76));
    }
}
