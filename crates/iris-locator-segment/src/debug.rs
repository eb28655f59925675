//! Debug observers for intermediate pipeline images.
//!
//! Snapshots are a side channel: the detector hands them to a [`DebugSink`]
//! and never reads anything back.

use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use iris_locator_core::Circle;

use crate::histogram::Histogram;

const HISTOGRAM_HEIGHT: u32 = 200;
const MAX_DRAWN_CANDIDATES: usize = 5;

const CANDIDATE_COLORS: [Rgb<u8>; 4] = [
    Rgb([255, 0, 0]),
    Rgb([0, 255, 0]),
    Rgb([0, 0, 255]),
    Rgb([128, 128, 0]),
];
const CHOSEN_COLOR: Rgb<u8> = Rgb([255, 0, 255]);
const MIN_RADIUS_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const MAX_RADIUS_COLOR: Rgb<u8> = Rgb([0, 255, 255]);

/// One intermediate result of a region's pipeline run.
#[derive(Clone, Copy, Debug)]
pub enum DebugSnapshot<'a> {
    Smoothed(&'a GrayImage),
    Histogram {
        histogram: &'a Histogram,
        threshold: u8,
    },
    Binary(&'a GrayImage),
    Edges(&'a GrayImage),
    Candidates {
        region: &'a GrayImage,
        candidates: &'a [Circle],
        chosen: Option<Circle>,
        min_radius: u32,
        max_radius: u32,
    },
}

impl DebugSnapshot<'_> {
    /// Short, file-name friendly label.
    pub fn name(&self) -> &'static str {
        match self {
            DebugSnapshot::Smoothed(_) => "smoothed",
            DebugSnapshot::Histogram { .. } => "histogram",
            DebugSnapshot::Binary(_) => "binary",
            DebugSnapshot::Edges(_) => "edges",
            DebugSnapshot::Candidates { .. } => "candidates",
        }
    }

    /// Render the snapshot as an RGB picture.
    pub fn render(&self) -> RgbImage {
        match *self {
            DebugSnapshot::Smoothed(img) | DebugSnapshot::Binary(img) | DebugSnapshot::Edges(img) => {
                gray_to_rgb(img)
            }
            DebugSnapshot::Histogram {
                histogram,
                threshold,
            } => render_histogram(histogram, Some(threshold)),
            DebugSnapshot::Candidates {
                region,
                candidates,
                chosen,
                min_radius,
                max_radius,
            } => render_candidates(region, candidates, chosen, min_radius, max_radius),
        }
    }
}

/// Receiver of debug snapshots.
pub trait DebugSink: Send + Sync {
    fn snapshot(&self, roi_index: usize, snapshot: &DebugSnapshot<'_>);
}

fn gray_to_rgb(img: &GrayImage) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let v = img.get_pixel(x, y)[0];
        Rgb([v, v, v])
    })
}

/// 256x200 bar plot on white, bars scaled to the tallest bin, with an
/// optional red marker at `highlight`.
pub fn render_histogram(histogram: &Histogram, highlight: Option<u8>) -> RgbImage {
    let mut plot = RgbImage::from_pixel(256, HISTOGRAM_HEIGHT, Rgb([255, 255, 255]));
    let max = histogram.max_count();
    if max > 0 {
        let bottom = (HISTOGRAM_HEIGHT - 1) as f32;
        for (i, &count) in histogram.bins().iter().enumerate() {
            if count == 0 {
                continue;
            }
            let bar = count as f32 / max as f32 * bottom;
            let x = i as f32;
            draw_line_segment_mut(&mut plot, (x, bottom), (x, bottom - bar), Rgb([0, 0, 0]));
        }
    }
    if let Some(t) = highlight {
        let x = t as f32;
        draw_line_segment_mut(
            &mut plot,
            (x, 0.0),
            (x, (HISTOGRAM_HEIGHT - 1) as f32),
            Rgb([255, 0, 0]),
        );
    }
    plot
}

/// Region with the first few candidates, the chosen circle and vertical guides
/// at `center ± min_radius` / `center ± max_radius`.
pub fn render_candidates(
    region: &GrayImage,
    candidates: &[Circle],
    chosen: Option<Circle>,
    min_radius: u32,
    max_radius: u32,
) -> RgbImage {
    let mut canvas = gray_to_rgb(region);
    let bottom = region.height().saturating_sub(1) as f32;
    let center = region.width() as f32 * 0.5;

    for (r, color) in [(min_radius, MIN_RADIUS_COLOR), (max_radius, MAX_RADIUS_COLOR)] {
        for x in [center - r as f32, center + r as f32] {
            draw_line_segment_mut(&mut canvas, (x, 0.0), (x, bottom), color);
        }
    }

    for (i, c) in candidates.iter().take(MAX_DRAWN_CANDIDATES).enumerate() {
        let color = CANDIDATE_COLORS[i.min(CANDIDATE_COLORS.len() - 1)];
        draw_circle(&mut canvas, c, color);
    }
    if let Some(c) = chosen {
        draw_circle(&mut canvas, &c, CHOSEN_COLOR);
    }
    canvas
}

fn draw_circle(canvas: &mut RgbImage, c: &Circle, color: Rgb<u8>) {
    draw_hollow_circle_mut(
        canvas,
        (c.center_x.round() as i32, c.center_y.round() as i32),
        c.radius.round() as i32,
        color,
    );
}
