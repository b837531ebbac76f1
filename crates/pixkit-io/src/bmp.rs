//! BMP image format support
//!
//! Writes Windows Bitmap (BMP) files at 1, 4, 8, 24 or 32 bits per pixel.
//!
//! # Layout
//!
//! ```text
//! BITMAPFILEHEADER   14 bytes  "BM", file size, reserved, pixel offset
//! BITMAPINFOHEADER   40 bytes  (124 for the V5 variant)
//! palette            4 bytes per entry, B G R 0
//! pixel rows         bottom-up, each padded to 4 bytes
//! ```
//!
//! 32-bit pixels carry opacity in their fourth byte (255 opaque).

use crate::{IoError, IoResult};
use pixkit_core::Pix;
use pixkit_core::color::{self, alpha_to_gray};
use std::io::Write;
use tracing::warn;

/// BMP file header size
pub const FILE_HEADER_SIZE: usize = 14;

/// BMP info header size (BITMAPINFOHEADER)
pub const INFO_HEADER_SIZE: usize = 40;

/// BMP V5 info header size (BITMAPV5HEADER)
pub const V5_HEADER_SIZE: usize = 124;

/// 96 dpi
const PIXELS_PER_METER: i32 = 3780;

const BI_RGB: u32 = 0;
const BI_BITFIELDS: u32 = 3;
/// 'sRGB'
const LCS_SRGB: u32 = 0x7352_4742;
const LCS_GM_ABS_COLORIMETRIC: u32 = 8;

/// Pixel layout of an encoded bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmpFormat {
    /// 1 bit per pixel, 1 or 2 palette colors; any nonzero index is set
    Mono,
    /// 4 bits per pixel, 1 to 16 palette colors
    Indexed4 {
        /// Write all 16 palette entries instead of only the used ones
        fill_palette: bool,
    },
    /// 8 bits per pixel, 1 to 256 palette colors
    Indexed8 {
        /// Write all 256 palette entries instead of only the used ones
        fill_palette: bool,
    },
    /// 24-bit BGR, alpha dropped
    Rgb24,
    /// 32-bit BGRA
    Rgba32 {
        /// Use the 124-byte V5 header with explicit channel masks
        v5_header: bool,
    },
}

impl BmpFormat {
    /// Format chosen for a standalone bitmap file.
    ///
    /// Truecolor images become 32-bit with a V5 header when they save
    /// alpha and 24-bit otherwise. Indexed images take the smallest depth
    /// that holds their palette.
    pub fn for_image(pix: &Pix) -> Self {
        match pix.palette() {
            None if pix.save_alpha() => BmpFormat::Rgba32 { v5_header: true },
            None => BmpFormat::Rgb24,
            Some(pal) => Self::indexed(pal.len(), false),
        }
    }

    /// Format chosen for an icon entry: plain 32-bit for truecolor images
    /// and full palettes for indexed ones.
    pub fn for_icon(pix: &Pix) -> Self {
        match pix.palette() {
            None => BmpFormat::Rgba32 { v5_header: false },
            Some(pal) => Self::indexed(pal.len(), true),
        }
    }

    fn indexed(colors: usize, fill_palette: bool) -> Self {
        if colors > 16 {
            BmpFormat::Indexed8 { fill_palette }
        } else if colors > 2 {
            BmpFormat::Indexed4 { fill_palette }
        } else {
            BmpFormat::Mono
        }
    }

    /// Bits per pixel.
    pub fn bit_count(self) -> u16 {
        match self {
            BmpFormat::Mono => 1,
            BmpFormat::Indexed4 { .. } => 4,
            BmpFormat::Indexed8 { .. } => 8,
            BmpFormat::Rgb24 => 24,
            BmpFormat::Rgba32 { .. } => 32,
        }
    }

    fn is_indexed(self) -> bool {
        self.bit_count() <= 8
    }

    /// Allowed palette sizes.
    fn color_range(self) -> std::ops::RangeInclusive<usize> {
        match self {
            BmpFormat::Mono => 1..=2,
            BmpFormat::Indexed4 { .. } => 1..=16,
            BmpFormat::Indexed8 { .. } => 1..=256,
            BmpFormat::Rgb24 | BmpFormat::Rgba32 { .. } => 0..=usize::MAX,
        }
    }

    /// Number of palette entries written for `colors` used colors.
    fn palette_entries(self, colors: usize) -> usize {
        match self {
            BmpFormat::Mono => 2,
            BmpFormat::Indexed4 { fill_palette: true } => 16,
            BmpFormat::Indexed8 { fill_palette: true } => 256,
            BmpFormat::Indexed4 { .. } | BmpFormat::Indexed8 { .. } => colors,
            BmpFormat::Rgb24 | BmpFormat::Rgba32 { .. } => 0,
        }
    }

    fn header_size(self) -> usize {
        match self {
            BmpFormat::Rgba32 { v5_header: true } => V5_HEADER_SIZE,
            _ => INFO_HEADER_SIZE,
        }
    }
}

/// Bytes per row, padded to a multiple of 4.
#[inline]
pub fn row_stride(width: u32, bit_count: u16) -> usize {
    (width as usize * bit_count as usize).div_ceil(32) * 4
}

fn put_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// Encode an image as a BMP file in the given format.
///
/// Indexed formats read palette indices and require an indexed image;
/// the 24- and 32-bit formats accept either mode and resolve indexed
/// pixels through the palette.
///
/// # Errors
///
/// Returns [`IoError::UnsupportedColorCount`] when the palette size does
/// not fit the format (a truecolor image has no palette colors), and
/// [`IoError::TooLarge`] when the file would reach `i32::MAX` bytes.
pub fn encode_bmp(pix: &Pix, format: BmpFormat) -> IoResult<Vec<u8>> {
    let (width, height) = (pix.width(), pix.height());
    let bits = format.bit_count();
    let colors = pix.palette().map_or(0, |p| p.len());
    if format.is_indexed() && !format.color_range().contains(&colors) {
        let err = IoError::UnsupportedColorCount { bits, colors };
        warn!("{err}");
        return Err(err);
    }

    let entries = format.palette_entries(colors);
    let image_offset = FILE_HEADER_SIZE + format.header_size() + 4 * entries;
    let line_size = row_stride(width, bits);
    let image_size = line_size * height as usize;
    let total = image_offset + image_size;
    if total >= i32::MAX as usize {
        return Err(IoError::TooLarge(total));
    }

    let mut buf = Vec::with_capacity(total);

    // BITMAPFILEHEADER
    buf.extend_from_slice(b"BM");
    put_u32(&mut buf, total as u32);
    put_u16(&mut buf, 0);
    put_u16(&mut buf, 0);
    put_u32(&mut buf, image_offset as u32);

    // BITMAPINFOHEADER
    let v5 = format.header_size() == V5_HEADER_SIZE;
    put_u32(&mut buf, format.header_size() as u32);
    put_i32(&mut buf, width as i32);
    put_i32(&mut buf, height as i32);
    put_u16(&mut buf, 1); // planes
    put_u16(&mut buf, bits);
    put_u32(&mut buf, if v5 { BI_BITFIELDS } else { BI_RGB });
    put_u32(&mut buf, image_size as u32);
    put_i32(&mut buf, PIXELS_PER_METER);
    put_i32(&mut buf, PIXELS_PER_METER);
    let clr_used = match format {
        BmpFormat::Indexed4 { fill_palette: false } if colors != 16 => colors,
        BmpFormat::Indexed8 { fill_palette: false } if colors != 256 => colors,
        _ => 0,
    };
    put_u32(&mut buf, clr_used as u32);
    put_u32(&mut buf, 0); // important colors

    if v5 {
        for mask in [0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0xff00_0000] {
            put_u32(&mut buf, mask);
        }
        put_u32(&mut buf, LCS_SRGB);
        // endpoints, unused for sRGB
        buf.extend_from_slice(&[0u8; 36]);
        for _ in 0..3 {
            put_u32(&mut buf, 1); // gamma
        }
        put_u32(&mut buf, LCS_GM_ABS_COLORIMETRIC);
        put_u32(&mut buf, 0); // profile data
        put_u32(&mut buf, 0); // profile size
        put_u32(&mut buf, 0); // reserved
    }

    // palette, zero-filled up to the written entry count
    if let Some(pal) = pix.palette().filter(|_| format.is_indexed()) {
        for e in pal.entries().iter().take(entries) {
            buf.extend_from_slice(&[e.blue, e.green, e.red, 0]);
        }
    }
    buf.resize(image_offset, 0);

    let source = if format.is_indexed() {
        pix.clone()
    } else {
        pix.to_truecolor()?
    };
    for y in (0..height).rev() {
        let eol = buf.len() + line_size;
        match format {
            BmpFormat::Mono => {
                let start = buf.len();
                buf.resize(eol, 0);
                for x in 0..width {
                    if source.get_index_unchecked(x, y) != 0 {
                        buf[start + x as usize / 8] |= 0x80 >> (x % 8);
                    }
                }
            }
            BmpFormat::Indexed4 { .. } => {
                for x in (0..width).step_by(2) {
                    let hi = source.get_index_unchecked(x, y) << 4;
                    let lo = if x + 1 < width {
                        source.get_index_unchecked(x + 1, y) & 0x0f
                    } else {
                        0
                    };
                    buf.push(hi | lo);
                }
            }
            BmpFormat::Indexed8 { .. } => {
                for x in 0..width {
                    buf.push(source.get_index_unchecked(x, y));
                }
            }
            BmpFormat::Rgb24 => {
                for x in 0..width {
                    let (r, g, b) = color::extract_rgb(source.get_argb_unchecked(x, y));
                    buf.extend_from_slice(&[b, g, r]);
                }
            }
            BmpFormat::Rgba32 { .. } => {
                for x in 0..width {
                    let (r, g, b, a) = color::extract_argb(source.get_argb_unchecked(x, y));
                    buf.extend_from_slice(&[b, g, r, alpha_to_gray(a)]);
                }
            }
        }
        buf.resize(eol, 0);
    }

    Ok(buf)
}

/// Encode an image as a standalone BMP file, choosing the format with
/// [`BmpFormat::for_image`].
pub fn write_bmp(pix: &Pix) -> IoResult<Vec<u8>> {
    encode_bmp(pix, BmpFormat::for_image(pix))
}

/// Encode an image as a standalone BMP file and write it to `writer`.
pub fn encode_bmp_to<W: Write>(pix: &Pix, mut writer: W) -> IoResult<()> {
    let bytes = write_bmp(pix)?;
    writer.write_all(&bytes)?;
    Ok(())
}
