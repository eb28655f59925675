//! Threshold-relative binarisation. Foreground (255) marks dark, pupil-like pixels.

use image::{GrayImage, Luma};

use crate::params::{BinarizeMode, BinarizeParams};

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Binarise `region` relative to the Otsu `threshold`.
///
/// In `InverseThreshold` mode with `dark_class_fallback`, a cutoff that selects
/// no pixel at all is replaced by Otsu's own dark class (`v <= threshold`).
/// Two-level regions hit this case: their threshold is the dark level itself.
pub fn binarize(region: &GrayImage, threshold: u8, params: &BinarizeParams) -> GrayImage {
    let mut lut = lookup_table(threshold, params);
    if params.mode == BinarizeMode::InverseThreshold
        && params.dark_class_fallback
        && !region.as_raw().iter().any(|&v| lut[v as usize] == FOREGROUND)
    {
        lut = std::array::from_fn(|v| {
            if v <= threshold as usize {
                FOREGROUND
            } else {
                BACKGROUND
            }
        });
    }
    let mut out = GrayImage::new(region.width(), region.height());
    for (dst, src) in out.pixels_mut().zip(region.pixels()) {
        *dst = Luma([lut[src[0] as usize]]);
    }
    out
}

fn lookup_table(threshold: u8, params: &BinarizeParams) -> [u8; 256] {
    let t = threshold as f64;
    let (lo, hi) = match params.mode {
        // strictly below the cutoff
        BinarizeMode::InverseThreshold => (f64::NEG_INFINITY, t * params.multiplier),
        BinarizeMode::Band => (t * (1.0 - params.band_delta), t * (1.0 + params.band_delta)),
    };
    std::array::from_fn(|v| {
        let v = v as f64;
        let inside = match params.mode {
            BinarizeMode::InverseThreshold => v < hi,
            BinarizeMode::Band => v >= lo && v <= hi,
        };
        if inside {
            FOREGROUND
        } else {
            BACKGROUND
        }
    })
}

/// Number of foreground pixels in a binary image.
pub fn foreground_count(binary: &GrayImage) -> usize {
    binary.as_raw().iter().filter(|&&v| v == FOREGROUND).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[u8]) -> GrayImage {
        GrayImage::from_raw(values.len() as u32, 1, values.to_vec()).unwrap()
    }

    #[test]
    fn inverse_threshold_keeps_dark_pixels() {
        let region = row(&[10, 69, 70, 71, 150]);
        let out = binarize(&region, 100, &BinarizeParams::default());
        assert_eq!(out.as_raw(), &vec![255, 255, 0, 0, 0]);
    }

    #[test]
    fn zero_threshold_selects_nothing_without_fallback() {
        let params = BinarizeParams {
            dark_class_fallback: false,
            ..BinarizeParams::default()
        };
        let region = row(&[0, 0, 128]);
        assert_eq!(foreground_count(&binarize(&region, 0, &params)), 0);
    }

    #[test]
    fn two_level_region_falls_back_to_the_dark_class() {
        // Otsu puts the split on the dark level: nothing is below 0.7 * 40.
        let region = row(&[40, 40, 200, 200, 200]);
        let out = binarize(&region, 40, &BinarizeParams::default());
        assert_eq!(out.as_raw(), &vec![255, 255, 0, 0, 0]);
    }

    #[test]
    fn fallback_is_unused_when_the_cutoff_selects_pixels() {
        let region = row(&[20, 90, 90, 210]);
        let out = binarize(&region, 90, &BinarizeParams::default());
        assert_eq!(out.as_raw(), &vec![255, 0, 0, 0]);
    }

    #[test]
    fn band_mode_drops_very_dark_pixels() {
        let params = BinarizeParams {
            mode: BinarizeMode::Band,
            ..BinarizeParams::default()
        };
        let region = row(&[5, 79, 80, 100, 120, 121, 250]);
        let out = binarize(&region, 100, &params);
        assert_eq!(out.as_raw(), &vec![0, 0, 255, 255, 255, 0, 0]);
    }
}
