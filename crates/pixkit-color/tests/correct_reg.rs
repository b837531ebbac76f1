//! Color correction regression test
//!
//! Checks the channel transfer curves produced by levels, gamma, tone
//! curves and negation, then applies full parameter sets to images.

use pixkit_color::{
    ChannelCorrectionParams, ColorCorrectionParams, ColorError, ColorSpace, ColorSpaceFlags,
    CorrectOutcome, color_correct, simulate,
};
use pixkit_core::color::{compose_argb, compose_rgb, extract_argb};
use pixkit_core::{Palette, PixMut};
use pixkit_test::{RegParams, fixtures};

#[test]
fn correct_reg() {
    pixkit_test::init_tracing();
    let mut rp = RegParams::new("correct");

    // --- Transfer curves ---
    let identity = simulate(&ChannelCorrectionParams::default().with_levels(&[0.0, 255.0])).unwrap();
    let expected: Vec<u8> = (0..=255).collect();
    rp.compare_strings(&expected, &identity);

    let negated = simulate(&ChannelCorrectionParams::default().with_negate(true)).unwrap();
    let expected: Vec<u8> = (0..=255u8).rev().collect();
    rp.compare_strings(&expected, &negated);

    let levels = simulate(&ChannelCorrectionParams::default().with_levels(&[0.0, 127.0])).unwrap();
    rp.compare_values(0.0, levels[0] as f64, 0.0);
    rp.compare_values(128.0, levels[64] as f64, 1.0);
    rp.compare_values(255.0, levels[127] as f64, 0.0);
    rp.compare_values(255.0, levels[200] as f64, 0.0);

    let gamma = simulate(&ChannelCorrectionParams::default().with_gamma(2.0)).unwrap();
    rp.compare_values(0.0, gamma[0] as f64, 0.0);
    rp.compare_values(128.0, gamma[64] as f64, 1.0);
    rp.compare_values(255.0, gamma[255] as f64, 0.0);
    rp.compare_values(1.0, gamma.windows(2).all(|w| w[0] <= w[1]) as i32 as f64, 0.0);

    // an identity tone curve leaves every level alone
    let curve =
        simulate(&ChannelCorrectionParams::default().with_tonecurve(&[(0.5, 0.5)])).unwrap();
    let worst = curve
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as i32 - v as i32).abs())
        .max()
        .unwrap_or(0);
    rp.compare_values(0.0, worst as f64, 1.0);

    // output range compresses after negation
    let compressed = simulate(
        &ChannelCorrectionParams::default()
            .with_levels(&[0.0, 255.0, 55.0, 200.0])
            .with_negate(true),
    )
    .unwrap();
    rp.compare_values(200.0, compressed[0] as f64, 1.0);
    rp.compare_values(55.0, compressed[255] as f64, 1.0);

    // --- Parameter errors ---
    let bad = ChannelCorrectionParams::default().with_levels(&[200.0, 100.0]);
    rp.compare_values(
        1.0,
        matches!(simulate(&bad), Err(ColorError::InvalidLevels)) as i32 as f64,
        0.0,
    );
    rp.compare_values(
        1.0,
        matches!(
            simulate(&ChannelCorrectionParams::default()),
            Err(ColorError::NothingToDo)
        ) as i32 as f64,
        0.0,
    );

    // --- RGB correction from JSON ---
    let params = ColorCorrectionParams::from_json(r#"{"negate": true, "b": {"negate": false}}"#)
        .unwrap();
    let mut image = fixtures::gradient(8, 8, 30).unwrap().into_mut();
    let out = color_correct(&mut image, &params, ColorSpace::Rgb).unwrap();
    rp.compare_values(1.0, (out == CorrectOutcome::Applied) as i32 as f64, 0.0);
    let (r, g, b, a) = extract_argb(image.get_argb_unchecked(0, 0));
    rp.compare_values(255.0, r as f64, 0.0);
    rp.compare_values(255.0, g as f64, 0.0);
    rp.compare_values(30.0, b as f64, 0.0);
    rp.compare_values(0.0, a as f64, 0.0);

    // --- HSV hue rotation by half a turn ---
    let params = ColorCorrectionParams::from_json(r#"{"h": 180}"#).unwrap();
    let mut image = PixMut::new_truecolor(2, 1).unwrap();
    image.set_argb_unchecked(0, 0, compose_rgb(255, 0, 0));
    image.set_argb_unchecked(1, 0, compose_argb(0, 0, 255, 64));
    color_correct(&mut image, &params, ColorSpace::Hsv).unwrap();
    rp.compare_values(
        compose_rgb(0, 255, 255) as f64,
        image.get_argb_unchecked(0, 0) as f64,
        0.0,
    );
    rp.compare_values(
        compose_argb(255, 255, 0, 64) as f64,
        image.get_argb_unchecked(1, 0) as f64,
        0.0,
    );

    // RGB blocks mean nothing to HSV
    let params = ColorCorrectionParams::from_json(r#"{"r": {"negate": true}}"#).unwrap();
    let mut image = PixMut::new_truecolor(1, 1).unwrap();
    let out = color_correct(&mut image, &params, ColorSpace::Hsv).unwrap();
    rp.compare_values(1.0, (out == CorrectOutcome::NothingToDo) as i32 as f64, 0.0);

    // --- Alpha pass on an indexed image ---
    let mut pal = Palette::new();
    pal.add_rgb(10, 20, 30).unwrap();
    let mut image = PixMut::new_indexed(2, 2, pal).unwrap();
    let params = ColorCorrectionParams::from_json(r#"{"a": {"negate": true}}"#).unwrap();
    let flags = ColorSpaceFlags::new(ColorSpace::Rgb).with_alpha(true);
    let out = color_correct(&mut image, &params, flags).unwrap();
    rp.compare_values(1.0, (out == CorrectOutcome::Applied) as i32 as f64, 0.0);
    rp.compare_values(1.0, image.is_truecolor() as i32 as f64, 0.0);
    rp.compare_values(
        compose_argb(10, 20, 30, 127) as f64,
        image.get_argb_unchecked(1, 1) as f64,
        0.0,
    );

    // --- CMYK: negating K turns white black ---
    let params = ColorCorrectionParams::from_json(r#"{"k": {"negate": true}}"#).unwrap();
    let mut image = PixMut::new_truecolor(1, 1).unwrap();
    image.fill(compose_rgb(255, 255, 255));
    color_correct(&mut image, &params, ColorSpace::Cmyk).unwrap();
    rp.compare_values(
        compose_rgb(0, 0, 0) as f64,
        image.get_argb_unchecked(0, 0) as f64,
        0.0,
    );

    assert!(rp.cleanup());
}
