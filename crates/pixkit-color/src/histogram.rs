//! Channel histograms
//!
//! Normalized 256-bin histograms of the channel values produced by
//! [`extract`](crate::compositor::extract).

use crate::colorspace::ColorSpaceFlags;
use crate::compositor::extract;
use crate::error::ColorResult;
use pixkit_core::Pix;

/// Number of bins per channel
pub const BINS: usize = 256;

/// Compute one histogram per extracted channel.
///
/// Each bin holds the fraction of pixels whose channel value equals the
/// bin index, so every histogram sums to 1. Channels come in the order
/// `extract` returns them, alpha last when requested.
pub fn histogram(pix: &Pix, flags: impl Into<ColorSpaceFlags>) -> ColorResult<Vec<[f64; BINS]>> {
    let planes = extract(pix, flags)?;
    let pixels = pix.width() as f64 * pix.height() as f64;
    Ok(planes
        .iter()
        .map(|plane| {
            let mut counts = [0u32; BINS];
            for &v in plane.data() {
                counts[(v & 0xff) as usize] += 1;
            }
            counts.map(|c| c as f64 / pixels)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorspace::ColorSpace;
    use pixkit_core::PixMut;
    use pixkit_core::color::compose_argb;

    #[test]
    fn test_histogram_rgb_alpha() {
        let mut pm = PixMut::new_truecolor(2, 2).unwrap();
        pm.fill(compose_argb(10, 20, 30, 0));
        pm.set_argb_unchecked(1, 1, compose_argb(255, 20, 0, 127));
        let pix: Pix = pm.into();

        let flags = ColorSpaceFlags::new(ColorSpace::Rgb).with_alpha(true);
        let hist = histogram(&pix, flags).unwrap();
        assert_eq!(hist.len(), 4);
        assert_eq!(hist[0][10], 0.75);
        assert_eq!(hist[0][255], 0.25);
        assert_eq!(hist[1][20], 1.0);
        assert_eq!(hist[3][255], 0.75);
        assert_eq!(hist[3][0], 0.25);
        for h in &hist {
            assert!((h.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_histogram_cmyk_channel_count() {
        let pix = Pix::new_truecolor(3, 1).unwrap();
        let hist = histogram(&pix, ColorSpace::Cmyk).unwrap();
        assert_eq!(hist.len(), 4);
        assert_eq!(hist[3][255], 1.0);
    }
}
