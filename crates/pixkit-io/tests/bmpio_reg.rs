//! BMP and ICO I/O regression test
//!
//! Encodes fixture images in every bitmap depth, reads the pixel rows
//! back from the byte stream and compares them with the source pixels.
//! Then packs several images into one icon and walks its directory.

use pixkit_core::Pix;
use pixkit_core::color::{alpha_to_gray, extract_argb};
use pixkit_io::bmp::row_stride;
use pixkit_io::{BmpFormat, IoError, encode_bmp, encode_ico, write_bmp};
use pixkit_test::{RegParams, fixtures};

fn u16_at(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn u32_at(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

/// Read the pixel at (x, y) from a BMP body whose info header starts at
/// `info`, as an index for palette depths or packed `(b, g, r, a)` bytes.
fn read_pixel(buf: &[u8], info: usize, x: u32, y: u32) -> u32 {
    let width = u32_at(buf, info + 4);
    let height = u32_at(buf, info + 8);
    let bits = u16_at(buf, info + 14);
    let pixels = u32_at(buf, 10) as usize;
    let stride = row_stride(width, bits);
    let row = &buf[pixels + (height - 1 - y) as usize * stride..];
    let x = x as usize;
    match bits {
        1 => ((row[x / 8] >> (7 - x % 8)) & 1) as u32,
        4 => ((row[x / 2] >> if x % 2 == 0 { 4 } else { 0 }) & 0x0f) as u32,
        8 => row[x] as u32,
        24 => u32::from_le_bytes([row[3 * x], row[3 * x + 1], row[3 * x + 2], 0]),
        _ => u32::from_le_bytes([row[4 * x], row[4 * x + 1], row[4 * x + 2], row[4 * x + 3]]),
    }
}

fn check_indexed(rp: &mut RegParams, pix: &Pix, buf: &[u8], bits: u16) {
    rp.compare_values(bits as f64, u16_at(buf, 28) as f64, 0.0);
    let mut mismatches = 0;
    for y in 0..pix.height() {
        for x in 0..pix.width() {
            if read_pixel(buf, 14, x, y) != pix.get_index_unchecked(x, y) as u32 {
                mismatches += 1;
            }
        }
    }
    rp.compare_values(0.0, mismatches as f64, 0.0);
}

fn check_truecolor(rp: &mut RegParams, pix: &Pix, buf: &[u8], with_alpha: bool) {
    let mut mismatches = 0;
    for y in 0..pix.height() {
        for x in 0..pix.width() {
            let (r, g, b, a) = extract_argb(pix.get_argb_unchecked(x, y));
            let a = if with_alpha { alpha_to_gray(a) } else { 0 };
            if read_pixel(buf, 14, x, y) != u32::from_le_bytes([b, g, r, a]) {
                mismatches += 1;
            }
        }
    }
    rp.compare_values(0.0, mismatches as f64, 0.0);
}

#[test]
fn bmpio_reg() {
    pixkit_test::init_tracing();
    let mut rp = RegParams::new("bmpio");

    // --- 1-bit checkerboard with an odd width ---
    let board = fixtures::checkerboard(21, 7, 3, 0x0000_0000, 0x00ff_ffff).unwrap();
    let buf = write_bmp(&board).unwrap();
    check_indexed(&mut rp, &board, &buf, 1);
    rp.compare_values(buf.len() as f64, u32_at(&buf, 2) as f64, 0.0);

    // --- 4-bit: a checkerboard forced into a filled 16-entry palette ---
    let buf = encode_bmp(&board, BmpFormat::Indexed4 { fill_palette: true }).unwrap();
    check_indexed(&mut rp, &board, &buf, 4);
    rp.compare_values((14 + 40 + 16 * 4) as f64, u32_at(&buf, 10) as f64, 0.0);

    // --- 8-bit gray ramp ---
    let gray = fixtures::gray_indexed(37, 5).unwrap();
    let buf = write_bmp(&gray).unwrap();
    check_indexed(&mut rp, &gray, &buf, 8);
    // a full 256 palette leaves the used-color count at 0
    rp.compare_values(0.0, u32_at(&buf, 46) as f64, 0.0);
    rp.compare_values(buf[14 + 40 + 4 * 200] as f64, 200.0, 0.0);

    // --- 24-bit gradient ---
    let grad = fixtures::gradient(13, 9, 77).unwrap();
    let buf = write_bmp(&grad).unwrap();
    rp.compare_values(24.0, u16_at(&buf, 28) as f64, 0.0);
    check_truecolor(&mut rp, &grad, &buf, false);

    // --- 32-bit V5 with an alpha ramp ---
    let ramp = fixtures::alpha_ramp(32, 3, (10, 20, 30)).unwrap();
    let buf = write_bmp(&ramp).unwrap();
    rp.compare_values(124.0, u32_at(&buf, 14) as f64, 0.0);
    rp.compare_values(32.0, u16_at(&buf, 28) as f64, 0.0);
    let v5 = &buf[14..];
    let first_pixel = u32_at(&buf, u32_at(&buf, 10) as usize);
    rp.compare_values(u32_at(v5, 40) as f64, 0x00ff_0000 as f64, 0.0);
    rp.compare_values(
        first_pixel as f64,
        u32::from_le_bytes([30, 20, 10, alpha_to_gray(0)]) as f64,
        0.0,
    );
    check_truecolor(&mut rp, &ramp, &buf, true);

    // --- Rejections ---
    let err = encode_bmp(&gray, BmpFormat::Indexed4 { fill_palette: false }).unwrap_err();
    rp.compare_values(
        1.0,
        matches!(err, IoError::UnsupportedColorCount { bits: 4, colors: 256 }) as i32 as f64,
        0.0,
    );

    assert!(rp.cleanup());
}

#[test]
fn icoio_reg() {
    pixkit_test::init_tracing();
    let mut rp = RegParams::new("icoio");

    let mut board = fixtures::checkerboard(16, 16, 4, 0x0000_0000, 0x00ff_ffff)
        .unwrap()
        .into_mut();
    if let Some(pal) = board.palette_mut() {
        pal.set_transparent(Some(1));
    }
    let images = [
        Pix::from(board),
        fixtures::gray_indexed(32, 32).unwrap(),
        fixtures::alpha_ramp(48, 48, (255, 0, 0)).unwrap(),
    ];
    let buf = encode_ico(&images).unwrap();
    rp.compare_values(3.0, u16_at(&buf, 4) as f64, 0.0);

    let mut expected_offset = 6 + 16 * images.len() as u32;
    for (i, (pix, bits)) in images.iter().zip([1u16, 8, 32]).enumerate() {
        let entry = 6 + 16 * i;
        rp.compare_values(pix.width() as f64, buf[entry] as f64, 0.0);
        rp.compare_values(bits as f64, u16_at(&buf, entry + 6) as f64, 0.0);
        let size = u32_at(&buf, entry + 8);
        let offset = u32_at(&buf, entry + 12);
        rp.compare_values(expected_offset as f64, offset as f64, 0.0);

        // doubled height in the stored info header
        let info = offset as usize;
        rp.compare_values((pix.height() * 2) as f64, u32_at(&buf, info + 8) as f64, 0.0);

        // mask is the last rows of the entry
        let mask_stride = row_stride(pix.width(), 1);
        let mask_start = info + size as usize - mask_stride * pix.height() as usize;
        let mut transparent = 0;
        for row in 0..pix.height() as usize {
            for x in 0..pix.width() as usize {
                let byte = buf[mask_start + row * mask_stride + x / 8];
                transparent += ((byte >> (7 - x % 8)) & 1) as u32;
            }
        }
        let want = match i {
            // every other 4x4 cell uses the transparent index
            0 => 16 * 16 / 2,
            1 => 0,
            // the last ramp column is fully transparent
            _ => pix.height(),
        };
        rp.compare_values(want as f64, transparent as f64, 0.0);
        expected_offset += size;
    }
    rp.compare_values(expected_offset as f64, buf.len() as f64, 0.0);

    let err = encode_ico(&[fixtures::gradient(300, 2, 0).unwrap()]).unwrap_err();
    rp.compare_values(
        1.0,
        matches!(err, IoError::InvalidIconDimensions { index: 0, .. }) as i32 as f64,
        0.0,
    );

    assert!(rp.cleanup());
}
