//! PIX - The image container
//!
//! A `Pix` is either **indexed** (one palette index per pixel plus a
//! [`Palette`]) or **truecolor** (one packed ARGB value per pixel, see
//! [`crate::color`]).
//!
//! # Pixel layout
//!
//! - One `u32` per pixel, rows stored top to bottom without padding
//! - Indexed pixels hold the palette index in the low byte
//! - Truecolor pixels hold `0xAARRGGBB` with a 7-bit alpha
//!
//! # Ownership model
//!
//! `Pix` uses `Arc` for cheap cloning (shared ownership).
//! To modify pixel data, convert to `PixMut` via [`Pix::try_into_mut`]
//! or [`Pix::to_mut`], then convert back with `Into<Pix>`. Operations
//! that create images build a `PixMut` directly and hand back a `Pix`.

mod access;
mod convert;

use crate::error::{Error, Result};
use crate::palette::Palette;
use std::sync::Arc;

/// Storage mode of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// Palette index per pixel
    Indexed,
    /// Packed ARGB per pixel
    TrueColor,
}

/// Internal PIX data
#[derive(Debug, Clone)]
struct PixData {
    width: u32,
    height: u32,
    /// Present exactly when the image is indexed
    palette: Option<Palette>,
    /// Keep the alpha channel when encoding
    save_alpha: bool,
    /// Composite instead of replace when drawing onto this image
    alpha_blending: bool,
    data: Vec<u32>,
}

impl PixData {
    fn new(width: u32, height: u32, palette: Option<Palette>) -> Result<Self> {
        if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(Error::InvalidDimension { width, height });
        }
        let size = (width as usize)
            .checked_mul(height as usize)
            .ok_or(Error::TooLarge { width, height })?;
        let alpha_blending = palette.is_none();
        Ok(Self {
            width,
            height,
            palette,
            save_alpha: false,
            alpha_blending,
            data: vec![0u32; size],
        })
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// PIX - Image container
///
/// # Examples
///
/// ```
/// use pixkit_core::{ColorMode, Pix};
///
/// let pix = Pix::new_truecolor(640, 480).unwrap();
/// assert_eq!(pix.width(), 640);
/// assert_eq!(pix.mode(), ColorMode::TrueColor);
/// ```
#[derive(Debug, Clone)]
pub struct Pix {
    inner: Arc<PixData>,
}

impl Pix {
    /// Create a truecolor image filled with opaque black.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0 or
    /// does not fit in an `i32`.
    pub fn new_truecolor(width: u32, height: u32) -> Result<Self> {
        Ok(PixMut::new_truecolor(width, height)?.into())
    }

    /// Create an indexed image with every pixel at index 0.
    pub fn new_indexed(width: u32, height: u32, palette: Palette) -> Result<Self> {
        Ok(PixMut::new_indexed(width, height, palette)?.into())
    }

    /// Get the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the storage mode.
    #[inline]
    pub fn mode(&self) -> ColorMode {
        if self.inner.palette.is_some() {
            ColorMode::Indexed
        } else {
            ColorMode::TrueColor
        }
    }

    #[inline]
    pub fn is_truecolor(&self) -> bool {
        self.inner.palette.is_none()
    }

    /// Get the palette of an indexed image.
    #[inline]
    pub fn palette(&self) -> Option<&Palette> {
        self.inner.palette.as_ref()
    }

    #[inline]
    pub fn save_alpha(&self) -> bool {
        self.inner.save_alpha
    }

    #[inline]
    pub fn alpha_blending(&self) -> bool {
        self.inner.alpha_blending
    }

    /// Get raw access to the image data.
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.inner.data
    }

    /// Get the pixels of one row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_data(&self, y: u32) -> &[u32] {
        let start = self.inner.offset(0, y);
        &self.inner.data[start..start + self.inner.width as usize]
    }

    /// Get the number of strong references to this PIX.
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Check if two images have the same size and mode.
    pub fn sizes_equal(&self, other: &Pix) -> bool {
        self.width() == other.width()
            && self.height() == other.height()
            && self.mode() == other.mode()
    }

    /// Create a deep copy of this PIX.
    ///
    /// Unlike `clone()` which shares data via Arc, this creates
    /// a completely independent copy with the same mode and palette.
    pub fn deep_clone(&self) -> Self {
        Pix {
            inner: Arc::new((*self.inner).clone()),
        }
    }

    /// Try to get mutable access to the image data.
    ///
    /// Succeeds only if there is exactly one reference to the data.
    pub fn try_into_mut(self) -> std::result::Result<PixMut, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(data) => Ok(PixMut { inner: data }),
            Err(arc) => Err(Pix { inner: arc }),
        }
    }

    /// Create a mutable copy of this PIX.
    pub fn to_mut(&self) -> PixMut {
        PixMut {
            inner: (*self.inner).clone(),
        }
    }

    /// Take mutable ownership, copying only if the data is shared.
    pub fn into_mut(self) -> PixMut {
        match self.try_into_mut() {
            Ok(pm) => pm,
            Err(shared) => shared.to_mut(),
        }
    }
}

/// Mutable PIX
///
/// Allows modification of image data. Convert back to an immutable
/// [`Pix`] using `Into<Pix>`.
#[derive(Debug)]
pub struct PixMut {
    inner: PixData,
}

impl PixMut {
    /// Create a truecolor image filled with opaque black.
    ///
    /// Alpha blending starts enabled and alpha saving disabled.
    pub fn new_truecolor(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            inner: PixData::new(width, height, None)?,
        })
    }

    /// Create an indexed image with every pixel at index 0.
    pub fn new_indexed(width: u32, height: u32, palette: Palette) -> Result<Self> {
        Ok(Self {
            inner: PixData::new(width, height, Some(palette))?,
        })
    }

    /// Get the image width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the storage mode.
    #[inline]
    pub fn mode(&self) -> ColorMode {
        if self.inner.palette.is_some() {
            ColorMode::Indexed
        } else {
            ColorMode::TrueColor
        }
    }

    #[inline]
    pub fn is_truecolor(&self) -> bool {
        self.inner.palette.is_none()
    }

    #[inline]
    pub fn palette(&self) -> Option<&Palette> {
        self.inner.palette.as_ref()
    }

    /// Get the palette for editing; `None` for truecolor images.
    #[inline]
    pub fn palette_mut(&mut self) -> Option<&mut Palette> {
        self.inner.palette.as_mut()
    }

    #[inline]
    pub fn save_alpha(&self) -> bool {
        self.inner.save_alpha
    }

    pub fn set_save_alpha(&mut self, save: bool) {
        self.inner.save_alpha = save;
    }

    #[inline]
    pub fn alpha_blending(&self) -> bool {
        self.inner.alpha_blending
    }

    pub fn set_alpha_blending(&mut self, blending: bool) {
        self.inner.alpha_blending = blending;
    }

    /// Get raw access to the image data.
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.inner.data
    }

    /// Get mutable access to the image data.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.inner.data
    }

    /// Get mutable access to a specific row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_data_mut(&mut self, y: u32) -> &mut [u32] {
        let start = self.inner.offset(0, y);
        let end = start + self.inner.width as usize;
        &mut self.inner.data[start..end]
    }

    /// Set every pixel to one raw value (index or ARGB).
    pub fn fill(&mut self, value: u32) {
        self.inner.data.fill(value);
    }
}

impl From<PixMut> for Pix {
    fn from(pix_mut: PixMut) -> Self {
        Pix {
            inner: Arc::new(pix_mut.inner),
        }
    }
}
