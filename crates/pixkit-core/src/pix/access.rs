//! Pixel access functions
//!
//! Low-level functions for getting and setting individual pixels.
//!
//! The `*_unchecked` variants index the buffer directly and panic when the
//! coordinate lies outside the image. The checked variants return `None`
//! or an error instead. [`Pix::get_argb`] resolves indexed pixels through
//! the palette so callers can treat both storage modes alike.

use super::{Pix, PixMut};
use crate::error::{Error, Result};

impl Pix {
    /// Check whether a signed coordinate lies inside the image.
    #[inline]
    pub fn bounds_safe(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width() as i64 && y < self.height() as i64
    }

    /// Get the raw pixel value (index or ARGB) at (x, y).
    ///
    /// Returns `None` if coordinates are out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.inner.data[self.inner.offset(x, y)])
    }

    /// Get the palette index at (x, y) without bounds checking.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    #[inline]
    pub fn get_index_unchecked(&self, x: u32, y: u32) -> u8 {
        (self.inner.data[self.inner.offset(x, y)] & 0xff) as u8
    }

    /// Get the packed ARGB value at (x, y) of a truecolor image without
    /// bounds checking.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    #[inline]
    pub fn get_argb_unchecked(&self, x: u32, y: u32) -> u32 {
        self.inner.data[self.inner.offset(x, y)]
    }

    /// Get the color at (x, y) as packed ARGB.
    ///
    /// Indexed pixels are looked up in the palette; the transparent index
    /// reports alpha 127 and open slots report `None`.
    pub fn get_argb(&self, x: u32, y: u32) -> Option<u32> {
        let raw = self.get_pixel(x, y)?;
        match self.palette() {
            None => Some(raw),
            Some(pal) => pal.argb((raw & 0xff) as u8),
        }
    }
}

impl PixMut {
    /// Check whether a signed coordinate lies inside the image.
    #[inline]
    pub fn bounds_safe(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width() as i64 && y < self.height() as i64
    }

    /// Get the raw pixel value at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.inner.data[self.inner.offset(x, y)])
    }

    #[inline]
    pub fn get_index_unchecked(&self, x: u32, y: u32) -> u8 {
        (self.inner.data[self.inner.offset(x, y)] & 0xff) as u8
    }

    #[inline]
    pub fn get_argb_unchecked(&self, x: u32, y: u32) -> u32 {
        self.inner.data[self.inner.offset(x, y)]
    }

    /// Get the color at (x, y) as packed ARGB, resolving palette indices.
    pub fn get_argb(&self, x: u32, y: u32) -> Option<u32> {
        let raw = self.get_pixel(x, y)?;
        match self.palette() {
            None => Some(raw),
            Some(pal) => pal.argb((raw & 0xff) as u8),
        }
    }

    /// Set the raw pixel value at (x, y).
    ///
    /// Truecolor values have bit 31 cleared; indexed values must name an
    /// existing palette entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if coordinates are out of bounds and
    /// [`Error::IndexOutOfBounds`] for an index past the palette end.
    pub fn set_pixel(&mut self, x: u32, y: u32, val: u32) -> Result<()> {
        let (width, height) = (self.width(), self.height());
        if x >= width || y >= height {
            return Err(Error::OutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        let val = match self.palette() {
            None => val & 0x7fff_ffff,
            Some(pal) => {
                if val as usize >= pal.len() {
                    return Err(Error::IndexOutOfBounds {
                        index: val as usize,
                        len: pal.len(),
                    });
                }
                val
            }
        };
        let offset = self.inner.offset(x, y);
        self.inner.data[offset] = val;
        Ok(())
    }

    /// Set the palette index at (x, y) without bounds checking.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    #[inline]
    pub fn set_index_unchecked(&mut self, x: u32, y: u32, index: u8) {
        let offset = self.inner.offset(x, y);
        self.inner.data[offset] = index as u32;
    }

    /// Set the packed ARGB value at (x, y) without bounds checking.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    #[inline]
    pub fn set_argb_unchecked(&mut self, x: u32, y: u32, argb: u32) {
        let offset = self.inner.offset(x, y);
        self.inner.data[offset] = argb & 0x7fff_ffff;
    }
}
