//! Edge extraction ahead of the circle search.

use std::borrow::Cow;

use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::morphology::open;

use crate::params::EdgeSource;

/// Pick (and if needed derive) the image the edge detector runs on.
pub fn edge_input<'a>(
    binary: &'a GrayImage,
    smoothed: &'a GrayImage,
    source: EdgeSource,
) -> Cow<'a, GrayImage> {
    match source {
        EdgeSource::Binary => Cow::Borrowed(binary),
        EdgeSource::Opened { iterations: 0 } => Cow::Borrowed(binary),
        EdgeSource::Opened { iterations } => Cow::Owned(open(binary, Norm::LInf, iterations)),
        EdgeSource::Smoothed => Cow::Borrowed(smoothed),
    }
}

/// Two-threshold (Canny) edge map; edge pixels are 255.
pub fn detect_edges(input: &GrayImage, low: f32, high: f32) -> GrayImage {
    canny(input, low, high)
}

/// Number of edge pixels in an edge map.
pub fn edge_count(edges: &GrayImage) -> usize {
    edges.as_raw().iter().filter(|&&v| v != 0).count()
}
