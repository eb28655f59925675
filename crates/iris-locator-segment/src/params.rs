//! Tunable coefficients of the segmentation pipeline.
//!
//! Every coefficient is expressed relative to the eye-region width so the
//! same configuration behaves consistently across upload resolutions.
//! [`RegionGeometry`] turns them into absolute pixel quantities for one region.

use serde::{Deserialize, Serialize};

use crate::error::ParamsError;
use crate::filter::{kernel_for_width, SmoothingKernel};

/// Noise-filter settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Kernel size as a fraction of the region width, before odd-size adjustment.
    pub kernel_coefficient: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            kernel_coefficient: 0.025,
        }
    }
}

/// How the binariser selects foreground pixels.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinarizeMode {
    /// Foreground where `value < threshold * multiplier`.
    #[default]
    InverseThreshold,
    /// Foreground where `value` lies in `[threshold * (1 - delta), threshold * (1 + delta)]`.
    Band,
}

/// Binariser settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarizeParams {
    pub mode: BinarizeMode,
    /// Multiplier applied to the Otsu threshold in `InverseThreshold` mode.
    pub multiplier: f64,
    /// Half-width of the intensity band, relative to the Otsu threshold.
    pub band_delta: f64,
    /// Equalise the smoothed region before binarisation.
    ///
    /// The Otsu threshold is then computed on the equalised histogram.
    pub equalize: bool,
    /// Use `value <= threshold` when the `InverseThreshold` cutoff selects nothing.
    pub dark_class_fallback: bool,
}

impl Default for BinarizeParams {
    fn default() -> Self {
        Self {
            mode: BinarizeMode::InverseThreshold,
            multiplier: 0.70,
            band_delta: 0.20,
            equalize: false,
            dark_class_fallback: true,
        }
    }
}

/// Which image the edge detector runs on.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EdgeSource {
    /// The binarised region.
    #[default]
    Binary,
    /// The binarised region after a morphological opening of `iterations` pixels.
    Opened { iterations: u8 },
    /// The smoothed grayscale region (binarisation only feeds diagnostics).
    Smoothed,
}

/// Canny edge settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeParams {
    pub source: EdgeSource,
    /// Base gradient magnitude; the high threshold is `base * high_multiplier`.
    pub base: f64,
    /// Valid range is 2..=16.
    pub high_multiplier: f64,
    /// Low threshold as a fraction of the high threshold.
    pub low_ratio: f64,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            source: EdgeSource::Binary,
            base: 5.0,
            high_multiplier: 2.0,
            low_ratio: 0.5,
        }
    }
}

/// Hough circle search settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughParams {
    /// Inverse accumulator resolution: one accumulator cell spans this many pixels.
    pub accumulator_scale: f64,
    /// Minimum distance between reported centers, relative to region width.
    pub min_dist_coefficient: f64,
    pub min_radius_coefficient: f64,
    pub max_radius_coefficient: f64,
    /// Vote threshold is `sensitivity_base + sensitivity_per_px * width`.
    pub sensitivity_base: f64,
    pub sensitivity_per_px: f64,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            accumulator_scale: 1.5,
            min_dist_coefficient: 0.05,
            min_radius_coefficient: 0.13,
            max_radius_coefficient: 0.30,
            sensitivity_base: 10.0,
            sensitivity_per_px: 0.10,
        }
    }
}

/// Candidate resolver settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveParams {
    /// Only the first `max_candidates` circles are considered.
    pub max_candidates: usize,
}

impl Default for ResolveParams {
    fn default() -> Self {
        Self { max_candidates: 25 }
    }
}

/// Full pipeline configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentParams {
    pub filter: FilterParams,
    pub binarize: BinarizeParams,
    pub edges: EdgeParams,
    pub hough: HoughParams,
    pub resolve: ResolveParams,
}

impl SegmentParams {
    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ParamsError> {
        positive("filter.kernel_coefficient", self.filter.kernel_coefficient)?;
        positive("binarize.multiplier", self.binarize.multiplier)?;
        in_range(
            "binarize.band_delta",
            "in [0, 1)",
            self.binarize.band_delta,
            |v| (0.0..1.0).contains(&v),
        )?;
        positive("edges.base", self.edges.base)?;
        in_range(
            "edges.high_multiplier",
            "in [2, 16]",
            self.edges.high_multiplier,
            |v| (2.0..=16.0).contains(&v),
        )?;
        in_range("edges.low_ratio", "in (0, 1]", self.edges.low_ratio, |v| {
            v > 0.0 && v <= 1.0
        })?;
        in_range(
            "hough.accumulator_scale",
            ">= 1",
            self.hough.accumulator_scale,
            |v| v >= 1.0,
        )?;
        positive("hough.min_dist_coefficient", self.hough.min_dist_coefficient)?;
        positive(
            "hough.min_radius_coefficient",
            self.hough.min_radius_coefficient,
        )?;
        positive(
            "hough.max_radius_coefficient",
            self.hough.max_radius_coefficient,
        )?;
        if self.hough.min_radius_coefficient > self.hough.max_radius_coefficient {
            return Err(ParamsError::RadiusBounds {
                min: self.hough.min_radius_coefficient,
                max: self.hough.max_radius_coefficient,
            });
        }
        in_range("hough.sensitivity_base", ">= 0", self.hough.sensitivity_base, |v| {
            v >= 0.0
        })?;
        in_range(
            "hough.sensitivity_per_px",
            ">= 0",
            self.hough.sensitivity_per_px,
            |v| v >= 0.0,
        )?;
        if self.resolve.max_candidates == 0 {
            return Err(ParamsError::OutOfRange {
                field: "resolve.max_candidates",
                requirement: ">= 1",
                value: 0.0,
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ParamsError> {
    in_range(field, "> 0", value, |v| v > 0.0)
}

fn in_range(
    field: &'static str,
    requirement: &'static str,
    value: f64,
    ok: impl Fn(f64) -> bool,
) -> Result<(), ParamsError> {
    if value.is_finite() && ok(value) {
        Ok(())
    } else {
        Err(ParamsError::OutOfRange {
            field,
            requirement,
            value,
        })
    }
}

/// Absolute, per-region quantities derived from [`SegmentParams`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionGeometry {
    pub width: u32,
    pub height: u32,
    pub kernel: SmoothingKernel,
    /// Minimum distance between two reported circle centers, in pixels.
    pub min_center_dist: f32,
    pub min_radius: u32,
    pub max_radius: u32,
    /// Spread-weighted accumulator votes (and radius support) a circle must exceed.
    pub vote_threshold: f32,
    pub canny_low: f32,
    pub canny_high: f32,
}

impl RegionGeometry {
    pub fn derive(width: u32, height: u32, params: &SegmentParams) -> Self {
        let w = width as f64;
        let hough = &params.hough;
        let min_radius = (w * hough.min_radius_coefficient) as u32;
        let max_radius = ((w * hough.max_radius_coefficient) as u32).max(min_radius);
        let canny_high = params.edges.base * params.edges.high_multiplier;

        Self {
            width,
            height,
            kernel: kernel_for_width(width, params.filter.kernel_coefficient),
            min_center_dist: ((w * hough.min_dist_coefficient) as u32).max(1) as f32,
            min_radius,
            max_radius,
            vote_threshold: (hough.sensitivity_base + hough.sensitivity_per_px * w) as f32,
            canny_low: (canny_high * params.edges.low_ratio) as f32,
            canny_high: canny_high as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn defaults_validate() {
        SegmentParams::default().validate().expect("defaults are valid");
    }

    #[test]
    fn geometry_for_a_100px_region() {
        let g = RegionGeometry::derive(100, 80, &SegmentParams::default());
        assert_eq!(g.kernel, SmoothingKernel::Median { size: 3 });
        assert_abs_diff_eq!(g.min_center_dist, 5.0);
        assert_eq!(g.min_radius, 13);
        assert_eq!(g.max_radius, 30);
        assert_abs_diff_eq!(g.vote_threshold, 20.0);
        assert_abs_diff_eq!(g.canny_high, 10.0);
        assert_abs_diff_eq!(g.canny_low, 5.0);
    }

    #[test]
    fn min_center_distance_never_collapses_to_zero() {
        let g = RegionGeometry::derive(8, 8, &SegmentParams::default());
        assert_abs_diff_eq!(g.min_center_dist, 1.0);
    }

    #[test]
    fn rejects_inverted_radius_bounds() {
        let mut params = SegmentParams::default();
        params.hough.min_radius_coefficient = 0.4;
        assert!(matches!(
            params.validate(),
            Err(ParamsError::RadiusBounds { .. })
        ));
    }

    #[test]
    fn rejects_edge_multiplier_outside_documented_range() {
        let mut params = SegmentParams::default();
        params.edges.high_multiplier = 20.0;
        assert!(matches!(
            params.validate(),
            Err(ParamsError::OutOfRange {
                field: "edges.high_multiplier",
                ..
            })
        ));
    }

    #[test]
    fn rejects_nan_coefficients() {
        let mut params = SegmentParams::default();
        params.filter.kernel_coefficient = f64::NAN;
        assert!(params.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let params: SegmentParams = serde_json::from_str(
            r#"{ "binarize": { "mode": "band" }, "edges": { "source": { "kind": "opened", "iterations": 2 } } }"#,
        )
        .expect("parse params");
        assert_eq!(params.binarize.mode, BinarizeMode::Band);
        assert_abs_diff_eq!(params.binarize.multiplier, 0.70);
        assert_eq!(params.edges.source, EdgeSource::Opened { iterations: 2 });
        assert_eq!(params.resolve.max_candidates, 25);
    }
}
