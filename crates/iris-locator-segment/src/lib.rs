//! Iris-candidate segmentation for cropped eye regions.
//!
//! Given a source image and a list of eye regions, [`IrisDetector`] returns
//! one optional circle per region:
//!
//! 1. crop the region to 8-bit luminance ([`extract_region`]),
//! 2. smooth it with a width-proportional median kernel ([`smooth`]),
//! 3. compute the Otsu threshold of its histogram ([`otsu_threshold`]),
//! 4. keep the dark, pupil-like pixels ([`binarize`]),
//! 5. run Canny on the binary image ([`detect_edges`]),
//! 6. search circles with a gradient Hough transform ([`find_circles`]),
//! 7. keep the circle closest to the region center ([`resolve_candidates`]).
//!
//! Every coefficient lives in [`SegmentParams`] and scales with the region
//! width. Progress events ([`EventSink`]) and intermediate images
//! ([`DebugSink`]) are optional observers and never change a result.
//!
//! ## Quickstart
//!
//! ```no_run
//! use iris_locator_core::{PixelFormat, Rect, SourceImage};
//! use iris_locator_segment::{IrisDetector, SegmentParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pixels = vec![0u8; 640 * 480];
//! let src = SourceImage::new(640, 480, PixelFormat::Gray8, &pixels)?;
//! let detector = IrisDetector::new(SegmentParams::default())?;
//!
//! let rois = [Rect::new(100, 120, 120, 80), Rect::new(380, 120, 120, 80)];
//! for (i, outcome) in detector.detect(&src, &rois).into_iter().enumerate() {
//!     match outcome {
//!         Ok(Some(iris)) => println!("roi {i}: {:?}", iris.to_image(&rois[i])),
//!         Ok(None) => println!("roi {i}: no iris"),
//!         Err(err) => println!("roi {i}: {err}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `rayon`: process regions in parallel (output order is unchanged).
//! - `tracing`: `tracing` spans on the detector entry points.

mod binarize;
mod debug;
mod edges;
mod error;
mod events;
mod filter;
mod histogram;
mod hough;
mod params;
mod pipeline;
mod region;
mod resolve;

pub use binarize::{binarize, foreground_count, BACKGROUND, FOREGROUND};
pub use debug::{render_candidates, render_histogram, DebugSink, DebugSnapshot};
pub use edges::{detect_edges, edge_count, edge_input};
pub use error::{ParamsError, SegmentError};
pub use events::{EventLog, EventSink, LogSink, NullSink, Stage, StageEvent};
pub use filter::{kernel_for_width, smooth, SmoothingKernel};
pub use histogram::{build_histogram, otsu_threshold, Histogram};
pub use hough::{find_circles, CircleSearch, HoughCircle};
pub use params::{
    BinarizeMode, BinarizeParams, EdgeParams, EdgeSource, FilterParams, HoughParams,
    RegionGeometry, ResolveParams, SegmentParams,
};
pub use pipeline::{IrisDetector, IrisResult, RoiOutcome, SegmentReport};
pub use region::extract_region;
pub use resolve::resolve_candidates;
