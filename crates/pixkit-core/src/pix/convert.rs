//! Storage mode conversion
//!
//! Converting an indexed image to truecolor replaces each index with the
//! palette color it names. The transparent index becomes alpha 127 and
//! indices of open or missing slots become opaque black.

use super::{Pix, PixData, PixMut};
use crate::error::Result;
use std::sync::Arc;

fn expand_palette(data: &mut PixData) {
    let Some(pal) = data.palette.take() else {
        return;
    };
    let lut: Vec<u32> = (0..=255u8).map(|i| pal.argb(i).unwrap_or(0)).collect();
    for px in data.data.iter_mut() {
        *px = lut[(*px & 0xff) as usize];
    }
    data.alpha_blending = true;
}

impl Pix {
    /// Return a truecolor version of this image.
    ///
    /// A truecolor image is returned as a shared clone.
    pub fn to_truecolor(&self) -> Result<Pix> {
        if self.is_truecolor() {
            return Ok(self.clone());
        }
        let mut data = (*self.inner).clone();
        expand_palette(&mut data);
        Ok(Pix {
            inner: Arc::new(data),
        })
    }
}

impl PixMut {
    /// Convert an indexed image to truecolor in place.
    ///
    /// Does nothing for a truecolor image.
    pub fn convert_to_truecolor(&mut self) {
        expand_palette(&mut self.inner);
    }
}

#[cfg(test)]
mod tests {
    use crate::palette::Palette;
    use crate::pix::{Pix, PixMut};

    #[test]
    fn test_to_truecolor() {
        let mut pal = Palette::new();
        pal.add_rgb(255, 0, 0).unwrap();
        pal.add_rgb(0, 0, 255).unwrap();
        pal.set_transparent(Some(1));
        let mut pm = PixMut::new_indexed(2, 1, pal).unwrap();
        pm.set_index_unchecked(1, 0, 1);
        let pix: Pix = pm.into();

        let tc = pix.to_truecolor().unwrap();
        assert!(tc.is_truecolor());
        assert!(tc.alpha_blending());
        assert_eq!(tc.get_argb(0, 0), Some(0x00ff_0000));
        assert_eq!(tc.get_argb(1, 0), Some(0x7f00_00ff));
        // source untouched
        assert!(!pix.is_truecolor());
    }

    #[test]
    fn test_convert_in_place() {
        let pal = Palette::linear_gray(256, true).unwrap();
        let mut pm = PixMut::new_indexed(1, 1, pal).unwrap();
        pm.set_index_unchecked(0, 0, 0x80);
        pm.convert_to_truecolor();
        assert!(pm.is_truecolor());
        assert_eq!(pm.get_argb(0, 0), Some(0x0080_8080));
        pm.convert_to_truecolor();
        assert_eq!(pm.get_argb(0, 0), Some(0x0080_8080));
    }
}
