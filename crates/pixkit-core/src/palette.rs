//! Palette - Color table for indexed images
//!
//! An indexed image stores one palette index per pixel. The palette holds
//! up to 256 entries, each with an RGB triple, a 7-bit alpha and an "open"
//! flag marking a slot that has been released and may be reused. One entry
//! may additionally be designated as the transparent index.

use crate::color;
use crate::error::{Error, Result};

/// Maximum number of palette entries
pub const MAX_COLORS: usize = 256;

/// A single palette slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaletteEntry {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// 0 (opaque) ..= 127 (transparent)
    pub alpha: u8,
    /// Slot has been released and is available for reuse
    pub open: bool,
}

impl PaletteEntry {
    /// Create an allocated entry.
    pub fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: alpha.min(color::MAX_ALPHA),
            open: false,
        }
    }

    /// Create an opaque entry.
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::new(red, green, blue, color::ALPHA_OPAQUE)
    }

    /// Create an opaque gray entry.
    pub fn gray(value: u8) -> Self {
        Self::rgb(value, value, value)
    }

    /// Packed ARGB value of this entry.
    #[inline]
    pub fn argb(&self) -> u32 {
        color::compose_argb(self.red, self.green, self.blue, self.alpha)
    }
}

/// Linear gray ramp layouts recognized by [`Palette::gray_ramp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrayRamp {
    /// 256 entries, 0 to 255 (index equals intensity)
    BlackToWhite8,
    /// 16 entries, 0 to 255 in steps of 17
    BlackToWhite4,
    /// 256 entries, 255 to 0
    WhiteToBlack8,
    /// 16 entries, 255 to 0 in steps of 17
    WhiteToBlack4,
}

impl GrayRamp {
    /// True when a pixel's index equals its intensity.
    pub fn index_is_intensity(self) -> bool {
        self == GrayRamp::BlackToWhite8
    }
}

/// Color table for indexed images
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
    transparent: Option<u8>,
}

impl Palette {
    /// Create an empty palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an opaque linear gray palette with `levels` entries.
    ///
    /// `levels` must be in `2..=256`. Entry `i` has intensity
    /// `i * 255 / (levels - 1)`, reversed when `ascending` is false.
    pub fn linear_gray(levels: usize, ascending: bool) -> Result<Self> {
        if !(2..=MAX_COLORS).contains(&levels) {
            return Err(Error::InvalidParameter(format!(
                "gray palette needs 2..=256 levels, got {levels}"
            )));
        }
        let entries = (0..levels)
            .map(|i| {
                let v = (i * 255 / (levels - 1)) as u8;
                PaletteEntry::gray(if ascending { v } else { 255 - v })
            })
            .collect();
        Ok(Self {
            entries,
            transparent: None,
        })
    }

    /// Number of entries, including open ones.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the palette has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries.
    #[inline]
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    /// Get an entry by index.
    #[inline]
    pub fn get(&self, index: u8) -> Option<&PaletteEntry> {
        self.entries.get(index as usize)
    }

    /// The transparent index, if any.
    #[inline]
    pub fn transparent(&self) -> Option<u8> {
        self.transparent
    }

    /// Designate (or clear) the transparent index.
    pub fn set_transparent(&mut self, index: Option<u8>) {
        self.transparent = index;
    }

    /// Append an entry, returning its index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PaletteFull`] when 256 entries are present.
    pub fn push(&mut self, entry: PaletteEntry) -> Result<u8> {
        if self.entries.len() >= MAX_COLORS {
            return Err(Error::PaletteFull(self.entries.len()));
        }
        self.entries.push(entry);
        Ok((self.entries.len() - 1) as u8)
    }

    /// Append an opaque RGB entry.
    pub fn add_rgb(&mut self, r: u8, g: u8, b: u8) -> Result<u8> {
        self.push(PaletteEntry::rgb(r, g, b))
    }

    /// Append an RGBA entry.
    pub fn add_rgba(&mut self, r: u8, g: u8, b: u8, a: u8) -> Result<u8> {
        self.push(PaletteEntry::new(r, g, b, a))
    }

    /// Replace an existing entry.
    pub fn set(&mut self, index: u8, entry: PaletteEntry) -> Result<()> {
        let len = self.entries.len();
        let slot = self
            .entries
            .get_mut(index as usize)
            .ok_or(Error::IndexOutOfBounds {
                index: index as usize,
                len,
            })?;
        *slot = entry;
        Ok(())
    }

    /// Release an entry so a later allocation may reuse it.
    pub fn deallocate(&mut self, index: u8) {
        if let Some(entry) = self.entries.get_mut(index as usize) {
            entry.open = true;
        }
        if self.transparent == Some(index) {
            self.transparent = None;
        }
    }

    /// ARGB value of an index, reporting the transparent index as alpha 127.
    ///
    /// Open or missing slots yield `None`.
    pub fn argb(&self, index: u8) -> Option<u32> {
        let entry = self.entries.get(index as usize).filter(|e| !e.open)?;
        if self.transparent == Some(index) {
            Some(color::compose_argb(
                entry.red,
                entry.green,
                entry.blue,
                color::ALPHA_TRANSPARENT,
            ))
        } else {
            Some(entry.argb())
        }
    }

    /// Find an allocated entry with exactly this color.
    pub fn exact(&self, r: u8, g: u8, b: u8, a: u8) -> Option<u8> {
        self.entries
            .iter()
            .position(|e| !e.open && e.red == r && e.green == g && e.blue == b && e.alpha == a)
            .map(|i| i as u8)
    }

    /// Find the allocated entry nearest to this color (squared RGBA distance).
    pub fn closest(&self, r: u8, g: u8, b: u8, a: u8) -> Option<u8> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.open)
            .min_by_key(|(_, e)| distance(e, r, g, b, a))
            .map(|(i, _)| i as u8)
    }

    /// Resolve a color to an index: an exact match, else a newly allocated
    /// slot (reusing the first open one), else the closest entry.
    pub fn resolve(&mut self, r: u8, g: u8, b: u8, a: u8) -> u8 {
        let a = a.min(color::MAX_ALPHA);
        let mut first_open = None;
        let mut best: Option<(u8, u32)> = None;
        for (i, e) in self.entries.iter().enumerate() {
            if e.open {
                first_open.get_or_insert(i);
                continue;
            }
            let d = distance(e, r, g, b, a);
            if d == 0 {
                return i as u8;
            }
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i as u8, d));
            }
        }
        let slot = match first_open {
            Some(i) => i,
            None if self.entries.len() < MAX_COLORS => {
                self.entries.push(PaletteEntry::default());
                self.entries.len() - 1
            }
            // A full palette always has at least one allocated entry.
            None => return best.map_or(0, |(i, _)| i),
        };
        self.entries[slot] = PaletteEntry::new(r, g, b, a);
        slot as u8
    }

    /// Detect whether the palette is a linear 16- or 256-level gray ramp.
    pub fn gray_ramp(&self) -> Option<GrayRamp> {
        let step = match self.entries.len() {
            256 => 1,
            16 => 17,
            _ => return None,
        };
        let first = self.entries[0].red as i32;
        let direction = match first {
            0 => 1,
            255 => -1,
            _ => return None,
        };
        let linear = self.entries.iter().enumerate().all(|(i, e)| {
            let k = first + direction * step * i as i32;
            e.red as i32 == k && e.green as i32 == k && e.blue as i32 == k
        });
        if !linear {
            return None;
        }
        Some(match (direction, step) {
            (1, 1) => GrayRamp::BlackToWhite8,
            (1, _) => GrayRamp::BlackToWhite4,
            (_, 1) => GrayRamp::WhiteToBlack8,
            _ => GrayRamp::WhiteToBlack4,
        })
    }
}

fn distance(e: &PaletteEntry, r: u8, g: u8, b: u8, a: u8) -> u32 {
    let dr = e.red as i32 - r as i32;
    let dg = e.green as i32 - g as i32;
    let db = e.blue as i32 - b as i32;
    let da = e.alpha as i32 - a as i32;
    (dr * dr + dg * dg + db * db + da * da) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_gray_256() {
        let pal = Palette::linear_gray(256, true).unwrap();
        assert_eq!(pal.len(), 256);
        assert_eq!(pal.get(0).unwrap().red, 0);
        assert_eq!(pal.get(255).unwrap().red, 255);
        assert_eq!(pal.gray_ramp(), Some(GrayRamp::BlackToWhite8));
    }

    #[test]
    fn test_linear_gray_16_descending() {
        let pal = Palette::linear_gray(16, false).unwrap();
        assert_eq!(pal.get(1).unwrap().green, 238);
        assert_eq!(pal.gray_ramp(), Some(GrayRamp::WhiteToBlack4));
        let asc = Palette::linear_gray(16, true).unwrap();
        assert_eq!(asc.gray_ramp(), Some(GrayRamp::BlackToWhite4));
    }

    #[test]
    fn test_gray_ramp_rejects_other_sizes() {
        let pal = Palette::linear_gray(4, true).unwrap();
        assert_eq!(pal.gray_ramp(), None);
        let mut tinted = Palette::linear_gray(256, true).unwrap();
        tinted.set(10, PaletteEntry::rgb(10, 11, 10)).unwrap();
        assert_eq!(tinted.gray_ramp(), None);
    }

    #[test]
    fn test_push_full() {
        let mut pal = Palette::linear_gray(256, true).unwrap();
        assert!(matches!(pal.add_rgb(1, 2, 3), Err(Error::PaletteFull(256))));
    }

    #[test]
    fn test_argb_transparent_index() {
        let mut pal = Palette::new();
        pal.add_rgb(10, 20, 30).unwrap();
        pal.add_rgb(40, 50, 60).unwrap();
        pal.set_transparent(Some(1));
        assert_eq!(pal.argb(0), Some(0x000a_141e));
        assert_eq!(pal.argb(1), Some(0x7f28_323c));
        assert_eq!(pal.argb(2), None);
    }

    #[test]
    fn test_resolve_exact_allocate_closest() {
        let mut pal = Palette::new();
        assert_eq!(pal.resolve(255, 0, 0, 0), 0);
        assert_eq!(pal.resolve(0, 255, 0, 0), 1);
        assert_eq!(pal.resolve(255, 0, 0, 0), 0);
        assert_eq!(pal.len(), 2);

        pal.deallocate(0);
        assert_eq!(pal.resolve(0, 0, 255, 0), 0);
        assert_eq!(pal.get(0).unwrap().blue, 255);

        let mut full = Palette::linear_gray(256, true).unwrap();
        assert_eq!(full.resolve(100, 102, 101, 0), 101);
    }
}
