//! Intensity histogram and Otsu threshold.

use image::GrayImage;

/// 256-bin intensity histogram of one region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram {
    bins: [u32; 256],
}

impl Histogram {
    /// Histogram from raw bin counts.
    pub fn from_bins(bins: [u32; 256]) -> Self {
        Self { bins }
    }

    #[inline]
    pub fn bins(&self) -> &[u32; 256] {
        &self.bins
    }

    /// Sum of all bins (equals the pixel count of the source region).
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|&b| b as u64).sum()
    }

    pub fn max_count(&self) -> u32 {
        self.bins.iter().copied().max().unwrap_or(0)
    }
}

/// Count every intensity of `region`.
pub fn build_histogram(region: &GrayImage) -> Histogram {
    let mut bins = [0u32; 256];
    for &v in region.as_raw() {
        bins[v as usize] += 1;
    }
    Histogram { bins }
}

/// Otsu threshold maximising the between-class variance.
///
/// Levels are scanned upwards; `t` goes to the background class. Empty
/// background prefixes are skipped and the scan stops once the foreground is
/// empty. Only a strictly larger variance replaces the current best, so ties
/// keep the lowest level. Returns 0 when no split exists (single-valued or
/// empty histogram).
pub fn otsu_threshold(histogram: &Histogram) -> u8 {
    let bins = histogram.bins();
    let total = histogram.total();

    let mut sum = 0f64;
    for (t, &h) in bins.iter().enumerate() {
        sum += (t as f64) * (h as f64);
    }

    let mut sum_b = 0f64;
    let mut w_b = 0u64;
    let mut best_var = 0f64;
    let mut best_t = 0u8;

    for (t, &h) in bins.iter().enumerate() {
        w_b += h as u64;
        if w_b == 0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f == 0 {
            break;
        }

        sum_b += (t as f64) * (h as f64);
        let m_b = sum_b / w_b as f64;
        let m_f = (sum - sum_b) / w_f as f64;

        let var_between = (w_b as f64) * (w_f as f64) * (m_b - m_f) * (m_b - m_f);
        if var_between > best_var {
            best_var = var_between;
            best_t = t as u8;
        }
    }

    best_t
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn gaussian_cluster(bins: &mut [u32; 256], mean: f64, sigma: f64, mass: f64) {
        for (t, bin) in bins.iter_mut().enumerate() {
            let z = (t as f64 - mean) / sigma;
            *bin += (mass * (-0.5 * z * z).exp()).round() as u32;
        }
    }

    #[test]
    fn histogram_sums_to_pixel_count() {
        let region = GrayImage::from_fn(37, 23, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]));
        let h = build_histogram(&region);
        assert_eq!(h.total(), 37 * 23);
    }

    #[test]
    fn bimodal_threshold_lies_between_modes() {
        let mut bins = [0u32; 256];
        gaussian_cluster(&mut bins, 40.0, 8.0, 500.0);
        gaussian_cluster(&mut bins, 200.0, 10.0, 800.0);
        let t = otsu_threshold(&Histogram::from_bins(bins));
        assert!(t > 40 && t < 200, "threshold {t}");
    }

    #[test]
    fn single_valued_histogram_returns_zero() {
        let region = GrayImage::from_pixel(16, 16, Luma([128]));
        assert_eq!(otsu_threshold(&build_histogram(&region)), 0);
    }

    #[test]
    fn empty_histogram_returns_zero() {
        assert_eq!(otsu_threshold(&Histogram::from_bins([0; 256])), 0);
    }

    #[test]
    fn two_levels_split_at_the_lower_level() {
        // Every level in [30, 199] yields the same variance; the first one wins.
        let mut bins = [0u32; 256];
        bins[30] = 100;
        bins[200] = 300;
        assert_eq!(otsu_threshold(&Histogram::from_bins(bins)), 30);
    }

    #[test]
    fn matches_reference_values_on_small_histogram() {
        // Levels 0..=3 with counts 1,3,3,1: symmetric, best split between 1 and 2.
        let mut bins = [0u32; 256];
        bins[0] = 1;
        bins[1] = 3;
        bins[2] = 3;
        bins[3] = 1;
        assert_eq!(otsu_threshold(&Histogram::from_bins(bins)), 1);
    }
}
