//! ICO image format support
//!
//! Packs one or more images into a Windows icon file. Each entry is stored
//! as a BMP without its file header, with the info header height doubled
//! to cover the 1-bit AND mask that follows the pixel rows.
//!
//! ```text
//! ICONDIR        6 bytes   reserved, type 1, image count
//! ICONDIRENTRY   16 bytes per image
//! image data     BITMAPINFOHEADER + palette + XOR rows + AND mask rows
//! ```

use crate::bmp::{self, BmpFormat, FILE_HEADER_SIZE};
use crate::{IoError, IoResult};
use pixkit_core::Pix;
use pixkit_core::color::{ALPHA_TRANSPARENT, alpha};
use std::io::Write;
use tracing::{debug, warn};

const ICONDIR_SIZE: usize = 6;
const ICONDIRENTRY_SIZE: usize = 16;
const MAX_ICON_SIZE: u32 = 256;

/// Build the AND mask of an image: one bit per pixel, rows bottom-up and
/// padded to 4 bytes, set where the pixel is fully transparent.
fn and_mask(pix: &Pix) -> Vec<u8> {
    let (width, height) = (pix.width(), pix.height());
    let stride = bmp::row_stride(width, 1);
    let transparent = pix.palette().and_then(|p| p.transparent());
    let mut mask = vec![0u8; stride * height as usize];
    for (row, y) in (0..height).rev().enumerate() {
        let line = &mut mask[row * stride..(row + 1) * stride];
        for x in 0..width {
            let clear = if pix.is_truecolor() {
                alpha(pix.get_argb_unchecked(x, y)) == ALPHA_TRANSPARENT
            } else {
                transparent == Some(pix.get_index_unchecked(x, y))
            };
            if clear {
                line[x as usize / 8] |= 0x80 >> (x % 8);
            }
        }
    }
    mask
}

/// Encode a set of images as an ICO file.
///
/// Truecolor images are stored as 32-bit bitmaps; indexed images use the
/// smallest of 1, 4 or 8 bits that holds their palette, with the palette
/// written in full.
///
/// # Errors
///
/// Returns [`IoError::NoImages`] for an empty slice,
/// [`IoError::TooManyImages`] past 65535 images and
/// [`IoError::InvalidIconDimensions`] when an image is larger than
/// 256x256.
pub fn encode_ico(images: &[Pix]) -> IoResult<Vec<u8>> {
    if images.is_empty() {
        return Err(IoError::NoImages);
    }
    if images.len() > u16::MAX as usize {
        return Err(IoError::TooManyImages(images.len()));
    }
    for (index, pix) in images.iter().enumerate() {
        let (width, height) = (pix.width(), pix.height());
        if !(1..=MAX_ICON_SIZE).contains(&width) || !(1..=MAX_ICON_SIZE).contains(&height) {
            let err = IoError::InvalidIconDimensions {
                index,
                width,
                height,
            };
            warn!("{err}");
            return Err(err);
        }
    }

    let mut bitmaps = Vec::with_capacity(images.len());
    for pix in images {
        let format = BmpFormat::for_icon(pix);
        let mut data = bmp::encode_bmp(pix, format)?.split_off(FILE_HEADER_SIZE);
        let doubled = (pix.height() as i32 * 2).to_le_bytes();
        data[8..12].copy_from_slice(&doubled);
        debug!(
            width = pix.width(),
            height = pix.height(),
            bits = format.bit_count(),
            "packing icon image"
        );
        bitmaps.push((format, data, and_mask(pix)));
    }

    let mut offset = ICONDIR_SIZE + ICONDIRENTRY_SIZE * images.len();
    let total = offset
        + bitmaps
            .iter()
            .map(|(_, data, mask)| data.len() + mask.len())
            .sum::<usize>();
    if total >= i32::MAX as usize {
        return Err(IoError::TooLarge(total));
    }

    let mut buf = Vec::with_capacity(total);
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&(images.len() as u16).to_le_bytes());

    for (pix, (format, data, mask)) in images.iter().zip(&bitmaps) {
        let size = data.len() + mask.len();
        // 256 wraps to 0 in the directory
        buf.push((pix.width() & 0xff) as u8);
        buf.push((pix.height() & 0xff) as u8);
        buf.push(0); // color count
        buf.push(0); // reserved
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&format.bit_count().to_le_bytes());
        buf.extend_from_slice(&(size as u32).to_le_bytes());
        buf.extend_from_slice(&(offset as u32).to_le_bytes());
        offset += size;
    }

    for (_, data, mask) in &bitmaps {
        buf.extend_from_slice(data);
        buf.extend_from_slice(mask);
    }

    Ok(buf)
}

/// Encode a set of images as an ICO file and write it to `writer`.
pub fn encode_ico_to<W: Write>(images: &[Pix], mut writer: W) -> IoResult<()> {
    let bytes = encode_ico(images)?;
    writer.write_all(&bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixkit_core::color::compose_argb;
    use pixkit_core::{Palette, PixMut};
    use pretty_assertions::assert_eq;

    fn u16_at(buf: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([buf[at], buf[at + 1]])
    }

    fn u32_at(buf: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
    }

    #[test]
    fn test_ico_single_pixel() {
        let pix = Pix::new_truecolor(1, 1).unwrap();
        let buf = encode_ico(&[pix]).unwrap();

        assert_eq!(buf.len(), 6 + 16 + 40 + 4 + 4);
        assert_eq!(u16_at(&buf, 0), 0);
        assert_eq!(u16_at(&buf, 2), 1);
        assert_eq!(u16_at(&buf, 4), 1);
        assert_eq!(&buf[6..10], &[1, 1, 0, 0]);
        assert_eq!(u16_at(&buf, 10), 1);
        assert_eq!(u16_at(&buf, 12), 32);
        assert_eq!(u32_at(&buf, 14), 48);
        assert_eq!(u32_at(&buf, 18), 22);
        // info header with doubled height
        assert_eq!(u32_at(&buf, 22), 40);
        assert_eq!(u32_at(&buf, 26), 1);
        assert_eq!(u32_at(&buf, 30), 2);
        assert_eq!(&buf[62..66], &[0, 0, 0, 255]);
        assert_eq!(&buf[66..], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_and_mask_truecolor() {
        let mut pm = PixMut::new_truecolor(3, 2).unwrap();
        pm.set_argb_unchecked(0, 0, compose_argb(0, 0, 0, 127));
        pm.set_argb_unchecked(2, 1, compose_argb(0, 0, 0, 127));
        pm.set_argb_unchecked(1, 1, compose_argb(0, 0, 0, 126));
        let mask = and_mask(&pm.into());
        // bottom row first
        assert_eq!(mask, vec![0b0010_0000, 0, 0, 0, 0b1000_0000, 0, 0, 0]);
    }

    #[test]
    fn test_and_mask_indexed() {
        let mut pal = Palette::new();
        pal.add_rgb(0, 0, 0).unwrap();
        pal.add_rgb(255, 255, 255).unwrap();
        pal.set_transparent(Some(1));
        let mut pm = PixMut::new_indexed(9, 1, pal).unwrap();
        pm.set_index_unchecked(8, 0, 1);
        let mask = and_mask(&pm.into());
        assert_eq!(mask, vec![0, 0b1000_0000, 0, 0]);
    }

    #[test]
    fn test_ico_indexed_uses_full_palette() {
        let mut pal = Palette::new();
        for i in 0..5 {
            pal.add_rgb(i, i, i).unwrap();
        }
        let pix = Pix::new_indexed(2, 2, pal).unwrap();
        let buf = encode_ico(&[pix]).unwrap();
        assert_eq!(u16_at(&buf, 12), 4);
        // 40 header + 16 palette entries + 2 rows of 4 + 2 mask rows of 4
        assert_eq!(u32_at(&buf, 14), 40 + 64 + 8 + 8);
    }

    #[test]
    fn test_ico_multiple_offsets() {
        let a = Pix::new_truecolor(2, 2).unwrap();
        let b = Pix::new_truecolor(256, 1).unwrap();
        let buf = encode_ico(&[a, b]).unwrap();
        let first = u32_at(&buf, 14);
        assert_eq!(u32_at(&buf, 18), 6 + 32);
        assert_eq!(u32_at(&buf, 34), 6 + 32 + first);
        assert_eq!(buf[22], 0);
        assert_eq!(buf.len() as u32, 6 + 32 + first + u32_at(&buf, 30));
    }

    #[test]
    fn test_ico_errors() {
        assert!(matches!(encode_ico(&[]), Err(IoError::NoImages)));
        let big = Pix::new_truecolor(257, 4).unwrap();
        let small = Pix::new_truecolor(4, 4).unwrap();
        assert!(matches!(
            encode_ico(&[small, big]),
            Err(IoError::InvalidIconDimensions {
                index: 1,
                width: 257,
                height: 4
            })
        ));
    }
}
