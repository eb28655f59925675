//! High-level facade crate for the `iris-locator-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the core types and the segmentation pipeline
//! - JSON configuration and report types used by the command-line tool
//! - (feature-gated) helpers that run the detector on decoded `image` buffers
//!
//! ## Quickstart
//!
//! ```no_run
//! use iris_locator::core::Rect;
//! use iris_locator::detect;
//! use iris_locator::segment::SegmentParams;
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = ImageReader::open("face.jpg")?.decode()?;
//! let rois = [Rect::new(210, 180, 120, 80), Rect::new(420, 180, 120, 80)];
//!
//! let outcomes = detect::detect_irises(&img, &rois, SegmentParams::default())?;
//! for (roi, outcome) in rois.iter().zip(&outcomes) {
//!     if let Ok(Some(iris)) = outcome {
//!         println!("iris at {:?}", iris.to_image(roi));
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `iris_locator::core`: source image view, regions, circles, logging setup.
//! - `iris_locator::segment`: the per-region pipeline and its parameters.
//! - `iris_locator::io`: `IrisDetectConfig` / `IrisReport` JSON files.
//! - `iris_locator::detect` (feature `image`): end-to-end helpers from `image::DynamicImage`.
//! - `iris_locator::debug_png` (feature `image`): PNG dumps of intermediate stages.

pub use iris_locator_core as core;
pub use iris_locator_segment as segment;

pub use iris_locator_core::{Circle, Rect};
pub use iris_locator_segment::{IrisDetector, IrisResult, RoiOutcome, SegmentParams};

pub mod io;

#[cfg(feature = "image")]
pub mod debug_png;
#[cfg(feature = "image")]
pub mod detect;
