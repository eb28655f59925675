//! Gradient-directed Hough circle search.
//!
//! Every edge pixel votes along its gradient line (both directions) for
//! centers at distances in `[min_radius, max_radius]`. A vote cast at distance
//! `r` is weighted by the spread its direction error causes there, so peak
//! height grows with the circle size the way edge support does. Accumulator
//! peaks above the vote threshold become center hypotheses, strongest first.
//! Each center picks the radius with the best normalised edge support, is
//! refined by a least-squares fit of the points near that radius, and is kept
//! when its support clears the threshold and it is far enough from the
//! circles already accepted. Reported radii always lie in the search bounds.

use image::GrayImage;
use imageproc::filter::gaussian_blur_f32;
use imageproc::gradients::{horizontal_scharr, vertical_scharr};
use iris_locator_core::Circle;

use crate::params::RegionGeometry;

const GRADIENT_SIGMA: f32 = 1.0;
/// Typical gradient direction error, in radians.
const DIRECTION_ERROR: f32 = 0.1;
const REFINE_ITERATIONS: usize = 3;

/// Search-space limits for one region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleSearch {
    pub min_radius: u32,
    pub max_radius: u32,
    pub min_center_dist: f32,
    pub vote_threshold: f32,
    /// Pixels per accumulator cell.
    pub accumulator_scale: f32,
}

impl CircleSearch {
    pub fn from_geometry(geometry: &RegionGeometry, accumulator_scale: f64) -> Self {
        Self {
            min_radius: geometry.min_radius,
            max_radius: geometry.max_radius,
            min_center_dist: geometry.min_center_dist,
            vote_threshold: geometry.vote_threshold,
            accumulator_scale: accumulator_scale as f32,
        }
    }
}

/// A circle candidate with the evidence that produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoughCircle {
    pub circle: Circle,
    /// Spread-weighted accumulator votes at the center peak.
    pub votes: f32,
    /// Edge pixels lying on the estimated radius.
    pub support: u32,
}

struct Accumulator {
    width: usize,
    height: usize,
    scale: f32,
    cells: Vec<f32>,
}

impl Accumulator {
    // One cell of padding on each side keeps the peak test free of bounds checks.
    fn new(img_w: u32, img_h: u32, scale: f32) -> Self {
        let width = (img_w as f32 / scale).ceil() as usize + 2;
        let height = (img_h as f32 / scale).ceil() as usize + 2;
        Self {
            width,
            height,
            scale,
            cells: vec![0.0; width * height],
        }
    }

    #[inline]
    fn vote(&mut self, x: f32, y: f32, weight: f32) {
        let ax = (x / self.scale) as usize + 1;
        let ay = (y / self.scale) as usize + 1;
        self.cells[ay * self.width + ax] += weight;
    }

    /// Local maxima above `threshold`, strongest first (ties in raster order).
    fn peaks(&self, threshold: f32) -> Vec<usize> {
        let w = self.width;
        let mut out = Vec::new();
        for ay in 1..self.height - 1 {
            for ax in 1..w - 1 {
                let i = ay * w + ax;
                let v = self.cells[i];
                if v > threshold
                    && v > self.cells[i - 1]
                    && v >= self.cells[i + 1]
                    && v > self.cells[i - w]
                    && v >= self.cells[i + w]
                {
                    out.push(i);
                }
            }
        }
        out.sort_by(|&a, &b| self.cells[b].total_cmp(&self.cells[a]));
        out
    }

    /// Vote-weighted centroid of the 3x3 neighbourhood of a peak, in pixels.
    fn refined_center(&self, peak: usize) -> (f32, f32) {
        let w = self.width;
        let (px, py) = (peak % w, peak / w);
        let mut sum = 0f32;
        let mut sx = 0f32;
        let mut sy = 0f32;
        for ay in py - 1..=py + 1 {
            for ax in px - 1..=px + 1 {
                let v = self.cells[ay * w + ax];
                sum += v;
                sx += v * self.cell_center(ax);
                sy += v * self.cell_center(ay);
            }
        }
        (sx / sum, sy / sum)
    }

    #[inline]
    fn cell_center(&self, a: usize) -> f32 {
        (a as f32 - 1.0 + 0.5) * self.scale
    }
}

/// Find circles on `edges` (non-zero = edge) using gradient directions taken
/// from `gradient_source`, which must have the same dimensions.
pub fn find_circles(
    edges: &GrayImage,
    gradient_source: &GrayImage,
    search: &CircleSearch,
) -> Vec<HoughCircle> {
    let (w, h) = edges.dimensions();
    if w < 3 || h < 3 || gradient_source.dimensions() != (w, h) {
        return Vec::new();
    }
    let min_r = search.min_radius.max(1) as f32;
    let max_r = search.max_radius as f32;
    if max_r < min_r {
        return Vec::new();
    }
    let scale = search.accumulator_scale.max(1.0);

    // Binary inputs have staircase boundaries; a light blur keeps the
    // gradient direction close to the true normal.
    let blurred = gaussian_blur_f32(gradient_source, GRADIENT_SIGMA);
    let gx = horizontal_scharr(&blurred);
    let gy = vertical_scharr(&blurred);

    let mut acc = Accumulator::new(w, h, scale);
    let mut points: Vec<(f32, f32)> = Vec::new();

    for (x, y, p) in edges.enumerate_pixels() {
        if p[0] == 0 {
            continue;
        }
        let dx = gx.get_pixel(x, y)[0] as f32;
        let dy = gy.get_pixel(x, y)[0] as f32;
        let mag = (dx * dx + dy * dy).sqrt();
        if mag <= f32::EPSILON {
            continue;
        }
        let (px, py) = (x as f32, y as f32);
        points.push((px, py));

        let (ux, uy) = (dx / mag, dy / mag);
        for sign in [1.0f32, -1.0] {
            let mut r = min_r;
            while r <= max_r {
                let cx = px + sign * r * ux;
                let cy = py + sign * r * uy;
                if cx < 0.0 || cy < 0.0 || cx >= w as f32 || cy >= h as f32 {
                    break;
                }
                acc.vote(cx, cy, (r * DIRECTION_ERROR / scale).max(1.0));
                r += scale;
            }
        }
    }

    if points.is_empty() {
        return Vec::new();
    }

    let mut found: Vec<HoughCircle> = Vec::new();
    let too_close = |found: &[HoughCircle], cx: f32, cy: f32| {
        found
            .iter()
            .any(|c| c.circle.distance_to(cx, cy) < search.min_center_dist)
    };
    for peak in acc.peaks(search.vote_threshold) {
        let (cx, cy) = acc.refined_center(peak);
        if too_close(&found, cx, cy) {
            continue;
        }
        let Some((radius, support)) = estimate_radius(&points, cx, cy, search) else {
            continue;
        };
        let Some((circle, support)) =
            refine(&points, Circle::new(cx, cy, radius), support, search)
        else {
            continue;
        };
        if (support as f32) <= search.vote_threshold
            || too_close(&found, circle.center_x, circle.center_y)
        {
            continue;
        }
        found.push(HoughCircle {
            circle,
            votes: acc.cells[peak],
            support,
        });
    }

    log::trace!(
        "hough: {} edge points, {} circles (r in [{}, {}])",
        points.len(),
        found.len(),
        search.min_radius,
        search.max_radius
    );
    found
}

/// Radius with the best `support / r` ratio, where support counts edge points
/// within one pixel of the radius. Returns the mean distance of those points,
/// clamped to the search bounds.
fn estimate_radius(
    points: &[(f32, f32)],
    cx: f32,
    cy: f32,
    search: &CircleSearch,
) -> Option<(f32, u32)> {
    let min_r = search.min_radius.max(1) as usize;
    let max_r = search.max_radius as usize;

    let mut counts = vec![0u32; max_r + 2];
    let mut sums = vec![0f32; max_r + 2];
    for &(x, y) in points {
        let d = ((x - cx) * (x - cx) + (y - cy) * (y - cy)).sqrt();
        let bin = d.round() as usize;
        if bin + 1 < min_r || bin > max_r + 1 {
            continue;
        }
        counts[bin] += 1;
        sums[bin] += d;
    }

    let mut best: Option<(usize, u32, f32)> = None;
    for r in min_r..=max_r {
        let support = counts[r - 1] + counts[r] + counts[r + 1];
        if support == 0 {
            continue;
        }
        let ratio = support as f32 / r as f32;
        if best.map(|(_, _, b)| ratio > b).unwrap_or(true) {
            best = Some((r, support, ratio));
        }
    }

    let (r, support, _) = best?;
    let total = sums[r - 1] + sums[r] + sums[r + 1];
    let radius = (total / support as f32).clamp(min_r as f32, max_r as f32);
    Some((radius, support))
}

/// Alternate a least-squares center fit of the edge points near `circle` with
/// a new radius estimate.
fn refine(
    points: &[(f32, f32)],
    mut circle: Circle,
    mut support: u32,
    search: &CircleSearch,
) -> Option<(Circle, u32)> {
    for _ in 0..REFINE_ITERATIONS {
        let band = (0.1 * circle.radius).max(2.0);
        let near = points
            .iter()
            .copied()
            .filter(|&(x, y)| (circle.distance_to(x, y) - circle.radius).abs() <= band);
        let Some((cx, cy)) = fit_center(near) else {
            break;
        };
        let (radius, s) = estimate_radius(points, cx, cy, search)?;
        circle = Circle::new(cx, cy, radius);
        support = s;
    }
    Some((circle, support))
}

/// Algebraic (Kasa) circle fit; returns the center, or `None` for fewer than
/// three points or a degenerate (collinear) set.
fn fit_center(points: impl Iterator<Item = (f32, f32)>) -> Option<(f32, f32)> {
    let pts: Vec<(f64, f64)> = points.map(|(x, y)| (x as f64, y as f64)).collect();
    if pts.len() < 3 {
        return None;
    }
    let n = pts.len() as f64;
    let mx = pts.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pts.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut suu, mut svv, mut suv) = (0.0, 0.0, 0.0);
    let (mut bu, mut bv) = (0.0, 0.0);
    for &(x, y) in &pts {
        let (u, v) = (x - mx, y - my);
        suu += u * u;
        svv += v * v;
        suv += u * v;
        bu += 0.5 * (u * u * u + u * v * v);
        bv += 0.5 * (v * v * v + v * u * u);
    }
    let det = suu * svv - suv * suv;
    if det.abs() <= 1e-9 * suu * svv {
        return None;
    }
    let uc = (bu * svv - bv * suv) / det;
    let vc = (suu * bv - suv * bu) / det;
    Some(((mx + uc) as f32, (my + vc) as f32))
}
