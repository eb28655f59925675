//! Noise filter with a kernel sized proportionally to the region width.

use image::GrayImage;
use imageproc::filter::{gaussian_blur_f32, median_filter};
use serde::{Deserialize, Serialize};

use crate::SegmentError;

/// Smoothing kernel chosen for one region.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SmoothingKernel {
    /// Rank (median) filter with an odd `size >= 3`.
    Median { size: u32 },
    /// Gaussian smoothing; used when the region is too small for a rank filter.
    Gaussian { size: u32 },
}

impl SmoothingKernel {
    #[inline]
    pub fn size(self) -> u32 {
        match self {
            SmoothingKernel::Median { size } | SmoothingKernel::Gaussian { size } => size,
        }
    }

    /// Sigma derived from the kernel size the way OpenCV does for `sigma <= 0`.
    fn gaussian_sigma(size: u32) -> f32 {
        0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    }
}

/// `round(coefficient * width)`, bumped to the next odd size; sizes `<= 1`
/// switch to a 1-px Gaussian since a rank filter of size 1 is undefined.
pub fn kernel_for_width(width: u32, coefficient: f64) -> SmoothingKernel {
    let raw = (coefficient * width as f64).round();
    if raw.is_nan() || raw <= 1.0 {
        return SmoothingKernel::Gaussian { size: 1 };
    }
    let mut size = raw as u32;
    if size % 2 == 0 {
        size += 1;
    }
    SmoothingKernel::Median { size }
}

/// Apply `kernel` to `region`, returning a new buffer of the same size.
pub fn smooth(region: &GrayImage, kernel: SmoothingKernel) -> Result<GrayImage, SegmentError> {
    let (width, height) = region.dimensions();
    if width == 0 || height == 0 {
        return Err(SegmentError::EmptyRegion { width, height });
    }
    let smoothed = match kernel {
        SmoothingKernel::Median { size } => {
            let radius = size / 2;
            median_filter(region, radius, radius)
        }
        SmoothingKernel::Gaussian { size } => {
            gaussian_blur_f32(region, SmoothingKernel::gaussian_sigma(size))
        }
    };
    Ok(smoothed)
}
