use std::sync::Arc;

use image::GrayImage;
use imageproc::contrast::equalize_histogram;
use iris_locator_core::{Circle, Rect, SourceImage};

#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::binarize::{binarize, foreground_count};
use crate::debug::{DebugSink, DebugSnapshot};
use crate::edges::{detect_edges, edge_count, edge_input};
use crate::events::{EventSink, NullSink, Stage, StageEvent};
use crate::filter::smooth;
use crate::histogram::{build_histogram, otsu_threshold, Histogram};
use crate::hough::{find_circles, CircleSearch, HoughCircle};
use crate::params::{RegionGeometry, SegmentParams};
use crate::region::extract_region;
use crate::resolve::resolve_candidates;
use crate::{ParamsError, SegmentError};

/// Iris estimate of one region, in region-local coordinates. `None` when no
/// circle survived the search.
pub type IrisResult = Option<Circle>;

/// Result slot of one region in a batch.
pub type RoiOutcome = Result<IrisResult, SegmentError>;

/// Intermediate data of one region run.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentReport {
    pub geometry: RegionGeometry,
    /// Otsu threshold of the (optionally equalised) smoothed region.
    pub threshold: u8,
    /// Hough candidates in detection order.
    pub candidates: Vec<HoughCircle>,
    pub iris: IrisResult,
}

/// Batch iris-candidate detector.
///
/// Each region runs through smoothing, Otsu binarisation, edge extraction and
/// a Hough circle search; the circle closest to the region center wins.
/// Regions are independent: one failing region never affects the others.
pub struct IrisDetector {
    params: SegmentParams,
    events: Arc<dyn EventSink>,
    debug: Option<Arc<dyn DebugSink>>,
}

impl IrisDetector {
    /// Create a detector after validating `params`.
    pub fn new(params: SegmentParams) -> Result<Self, ParamsError> {
        params.validate()?;
        Ok(Self {
            params,
            events: Arc::new(NullSink),
            debug: None,
        })
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    pub fn with_debug_sink(mut self, sink: Arc<dyn DebugSink>) -> Self {
        self.debug = Some(sink);
        self
    }

    #[inline]
    pub fn params(&self) -> &SegmentParams {
        &self.params
    }

    /// Run every region of `rois` against `src`.
    ///
    /// The output has exactly one slot per ROI, in input order.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, src, rois), fields(width = src.width(), height = src.height(), rois = rois.len()))
    )]
    pub fn detect(&self, src: &SourceImage<'_>, rois: &[Rect]) -> Vec<RoiOutcome> {
        #[cfg(feature = "rayon")]
        let outcomes: Vec<RoiOutcome> = rois
            .par_iter()
            .enumerate()
            .map(|(i, roi)| self.detect_region(src, i, *roi))
            .collect();
        #[cfg(not(feature = "rayon"))]
        let outcomes: Vec<RoiOutcome> = rois
            .iter()
            .enumerate()
            .map(|(i, roi)| self.detect_region(src, i, *roi))
            .collect();

        let found = outcomes
            .iter()
            .filter(|o| matches!(o, Ok(Some(_))))
            .count();
        log::debug!("detect: {found}/{} regions with an iris", rois.len());
        outcomes
    }

    /// Run one region. `roi_index` only labels events and snapshots.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, src))
    )]
    pub fn detect_region(&self, src: &SourceImage<'_>, roi_index: usize, roi: Rect) -> RoiOutcome {
        let outcome = extract_region(src, &roi)
            .and_then(|region| self.run(roi_index, region))
            .map(|report| report.iris);
        if let Err(err) = &outcome {
            log::warn!("roi {roi_index} {roi:?}: {err}");
        }
        outcome
    }

    /// Run the stages after extraction on an already grayscale region.
    pub fn segment_gray(&self, region: &GrayImage) -> Result<SegmentReport, SegmentError> {
        self.run(0, region.clone())
    }

    fn run(&self, roi_index: usize, region: GrayImage) -> Result<SegmentReport, SegmentError> {
        let ctx = PipelineContext::new(self, roi_index, region);
        ctx.process()
    }
}

/// Owned working state of one region; created per run and dropped with it.
struct PipelineContext<'d> {
    detector: &'d IrisDetector,
    roi_index: usize,
    region: GrayImage,
    geometry: RegionGeometry,
}

impl<'d> PipelineContext<'d> {
    fn new(detector: &'d IrisDetector, roi_index: usize, region: GrayImage) -> Self {
        let (w, h) = region.dimensions();
        Self {
            detector,
            roi_index,
            geometry: RegionGeometry::derive(w, h, &detector.params),
            region,
        }
    }

    fn emit(&self, stage: Stage, message: String) {
        self.detector.events.emit(&StageEvent {
            roi_index: self.roi_index,
            stage,
            message,
        });
    }

    fn snapshot(&self, snapshot: DebugSnapshot<'_>) {
        if let Some(sink) = &self.detector.debug {
            sink.snapshot(self.roi_index, &snapshot);
        }
    }

    fn process(self) -> Result<SegmentReport, SegmentError> {
        let params = &self.detector.params;
        let g = self.geometry;
        self.emit(
            Stage::Processing,
            format!("{}x{} region, {:?}", g.width, g.height, g.kernel),
        );

        let mut smoothed = smooth(&self.region, g.kernel)?;
        if params.binarize.equalize {
            smoothed = equalize_histogram(&smoothed);
        }
        self.snapshot(DebugSnapshot::Smoothed(&smoothed));

        let histogram = build_histogram(&smoothed);
        self.emit(Stage::Histogram, histogram_summary(&histogram));

        let threshold = otsu_threshold(&histogram);
        self.emit(Stage::Otsu, format!("threshold {threshold}"));
        self.snapshot(DebugSnapshot::Histogram {
            histogram: &histogram,
            threshold,
        });

        let binary = binarize(&smoothed, threshold, &params.binarize);
        self.snapshot(DebugSnapshot::Binary(&binary));

        let input = edge_input(&binary, &smoothed, params.edges.source);
        let edges = detect_edges(&input, g.canny_low, g.canny_high);
        self.emit(
            Stage::Edges,
            format!(
                "{} foreground px, {} edge px (canny {}/{})",
                foreground_count(&binary),
                edge_count(&edges),
                g.canny_low,
                g.canny_high
            ),
        );
        self.snapshot(DebugSnapshot::Edges(&edges));

        let search = CircleSearch::from_geometry(&g, params.hough.accumulator_scale);
        let candidates = find_circles(&edges, &input, &search);
        self.emit(
            Stage::Circles,
            format!(
                "{} candidates (r {}..={}, threshold {})",
                candidates.len(),
                g.min_radius,
                g.max_radius,
                g.vote_threshold
            ),
        );

        let circles: Vec<Circle> = candidates.iter().map(|c| c.circle).collect();
        let iris = resolve_candidates(&circles, g.width, g.height, params.resolve.max_candidates);
        self.emit(
            Stage::Resolved,
            match iris {
                Some(c) => format!(
                    "iris at ({:.1}, {:.1}) r {:.1}",
                    c.center_x, c.center_y, c.radius
                ),
                None => "no iris".to_string(),
            },
        );
        self.snapshot(DebugSnapshot::Candidates {
            region: &self.region,
            candidates: &circles,
            chosen: iris,
            min_radius: g.min_radius,
            max_radius: g.max_radius,
        });

        Ok(SegmentReport {
            geometry: g,
            threshold,
            candidates,
            iris,
        })
    }
}

fn histogram_summary(histogram: &Histogram) -> String {
    let bins = histogram.bins();
    let lo = bins.iter().position(|&b| b > 0);
    let hi = bins.iter().rposition(|&b| b > 0);
    match (lo, hi) {
        (Some(lo), Some(hi)) => format!("{} px, levels {lo}..={hi}", histogram.total()),
        _ => "empty".to_string(),
    }
}
