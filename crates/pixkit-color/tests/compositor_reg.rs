//! Channel compositing regression test
//!
//! Splits fixture images into channel planes, merges them back and applies
//! gray images as alpha masks.

use pixkit_color::{
    ColorError, ColorSpace, ColorSpaceFlags, MaskMode, MaskOptions, MergeOptions, alpha_mask,
    extract, histogram, merge,
};
use pixkit_core::color::{alpha, compose_argb};
use pixkit_core::{Align, Pix, PixMut, Position, VAlign};
use pixkit_test::{RegParams, fixtures};

#[test]
fn compositor_reg() {
    pixkit_test::init_tracing();
    let mut rp = RegParams::new("compositor");

    // --- RGB split and merge ---
    let src = fixtures::gradient(16, 12, 40).unwrap();
    let planes = extract(&src, ColorSpace::Rgb).unwrap();
    rp.compare_values(3.0, planes.len() as f64, 0.0);
    rp.compare_values(255.0, planes[0].get_index_unchecked(15, 0) as f64, 0.0);
    rp.compare_values(40.0, planes[2].get_index_unchecked(7, 7) as f64, 0.0);
    let back = merge(&planes, ColorSpace::Rgb, &MergeOptions::default()).unwrap();
    rp.compare_pix(&src, &back);

    // --- RGBA round trip through gray alpha and raw alpha ---
    let ramp = fixtures::alpha_ramp(128, 2, (200, 100, 50)).unwrap();
    let rgba = ColorSpaceFlags::new(ColorSpace::Rgb).with_alpha(true);
    let planes = extract(&ramp, rgba).unwrap();
    rp.compare_values(4.0, planes.len() as f64, 0.0);
    rp.compare_values(255.0, planes[3].get_index_unchecked(0, 0) as f64, 0.0);
    rp.compare_values(0.0, planes[3].get_index_unchecked(127, 0) as f64, 0.0);
    let back = merge(&planes, rgba, &MergeOptions::default()).unwrap();
    rp.compare_pix(&ramp, &back);

    let raw = rgba.with_raw_alpha(true);
    let planes = extract(&ramp, raw).unwrap();
    rp.compare_values(127.0, planes[3].get_index_unchecked(127, 1) as f64, 0.0);
    let back = merge(&planes, raw, &MergeOptions::default()).unwrap();
    rp.compare_pix(&ramp, &back);

    // --- HSV and CMYK survive a split and merge within rounding ---
    // hue is quantized to 8 bits, which costs a few levels per channel
    let warm = fixtures::gradient(16, 12, 0).unwrap();
    for space in [ColorSpace::Hsv, ColorSpace::Cmyk] {
        let planes = extract(&warm, space).unwrap();
        rp.compare_values(space.arity() as f64, planes.len() as f64, 0.0);
        let back = merge(&planes, space, &MergeOptions::default()).unwrap();
        let mut worst = 0i32;
        for (a, b) in warm.data().iter().zip(back.data()) {
            for shift in [0, 8, 16] {
                let d = ((a >> shift) & 0xff) as i32 - ((b >> shift) & 0xff) as i32;
                worst = worst.max(d.abs());
            }
        }
        rp.compare_values(0.0, worst as f64, 8.0);
    }

    // --- Mixed sizes: grow, crop and placement ---
    let big = Pix::new_truecolor(8, 6).unwrap();
    let mut small = PixMut::new_truecolor(4, 2).unwrap();
    small.fill(compose_argb(255, 255, 255, 0));
    let small: Pix = small.into();
    let mut red = extract(&big, ColorSpace::Rgb).unwrap();
    red[0] = extract(&small, ColorSpace::Rgb).unwrap().remove(0);

    let grown = merge(&red, ColorSpace::Rgb, &MergeOptions::default()).unwrap();
    rp.compare_values(8.0, grown.width() as f64, 0.0);
    rp.compare_values(6.0, grown.height() as f64, 0.0);
    // default position is centered: the small plane covers x 2..6, y 2..4
    rp.compare_values(255.0, ((grown.get_argb_unchecked(2, 2) >> 16) & 0xff) as f64, 0.0);
    rp.compare_values(0.0, ((grown.get_argb_unchecked(1, 2) >> 16) & 0xff) as f64, 0.0);

    let cropped = merge(&red, ColorSpace::Rgb, &MergeOptions::default().with_crop(true)).unwrap();
    rp.compare_values(4.0, cropped.width() as f64, 0.0);
    rp.compare_values(2.0, cropped.height() as f64, 0.0);

    let corner = MergeOptions::default().with_position(Position::top_left());
    let grown = merge(&red, ColorSpace::Rgb, &corner).unwrap();
    rp.compare_values(255.0, ((grown.get_argb_unchecked(0, 0) >> 16) & 0xff) as f64, 0.0);

    // --- Missing channels are reported ---
    let err = merge(&red[..2], ColorSpace::Rgb, &MergeOptions::default()).unwrap_err();
    rp.compare_values(
        1.0,
        matches!(err, ColorError::NotEnoughChannels { required: 3, given: 2, .. }) as i32 as f64,
        0.0,
    );

    // --- Alpha mask from an indexed gray image ---
    let mask = fixtures::gray_indexed(6, 6).unwrap();
    let mut target = src.deep_clone().into_mut();
    alpha_mask(&mut target, &mask, MaskMode::Set, &MaskOptions::default()).unwrap();
    // the 6x6 mask is centered on the 16x12 target at (5, 3)
    rp.compare_values(127.0, alpha(target.get_argb_unchecked(0, 0)) as f64, 0.0);
    rp.compare_values(127.0, alpha(target.get_argb_unchecked(5, 3)) as f64, 0.0);
    rp.compare_values(
        (127 - 10 / 2) as f64,
        alpha(target.get_argb_unchecked(10, 8)) as f64,
        0.0,
    );
    rp.compare_values(1.0, target.save_alpha() as i32 as f64, 0.0);

    // tiled and negated, anchored at the top left
    let mut target = src.deep_clone().into_mut();
    let opts = MaskOptions::default()
        .with_tile(true)
        .with_negate(true)
        .with_position(Position::new(Align::Left, VAlign::Top));
    alpha_mask(&mut target, &mask, MaskMode::Set, &opts).unwrap();
    // mask index at (7, 1) is (1 + 1) = 2 -> alpha 126 -> negated 1
    rp.compare_values(1.0, alpha(target.get_argb_unchecked(7, 1)) as f64, 0.0);
    rp.compare_values(
        alpha(target.get_argb_unchecked(1, 1)) as f64,
        alpha(target.get_argb_unchecked(13, 7)) as f64,
        0.0,
    );

    // --- AND and OR work on the inverted alpha scale ---
    // a black mask reads as fully transparent; AND keeps the more
    // transparent value, OR the more opaque one
    let black = Pix::new_truecolor(2, 2).unwrap();
    let mut opaque = PixMut::new_truecolor(2, 2).unwrap();
    opaque.fill(compose_argb(10, 20, 30, 0));
    let opaque: Pix = opaque.into();

    let mut target = opaque.deep_clone().into_mut();
    alpha_mask(&mut target, &black, MaskMode::And, &MaskOptions::default()).unwrap();
    rp.compare_values(127.0, alpha(target.get_argb_unchecked(0, 0)) as f64, 0.0);
    rp.compare_values(127.0, alpha(target.get_argb_unchecked(1, 1)) as f64, 0.0);

    let mut target = opaque.deep_clone().into_mut();
    alpha_mask(&mut target, &black, MaskMode::Or, &MaskOptions::default()).unwrap();
    rp.compare_values(0.0, alpha(target.get_argb_unchecked(0, 0)) as f64, 0.0);
    rp.compare_values(0.0, alpha(target.get_argb_unchecked(1, 1)) as f64, 0.0);

    // --- Histogram of the alpha ramp is flat over its levels ---
    let hist = histogram(&ramp, rgba).unwrap();
    rp.compare_values(1.0, hist[0][200], 0.0);
    rp.compare_values(1.0, hist[3].iter().sum::<f64>(), 1e-9);

    assert!(rp.cleanup());
}
