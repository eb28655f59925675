//! Core types and utilities for iris localisation.
//!
//! This crate is intentionally small. It does *not* depend on any concrete
//! image-processing library: it only describes the borrowed source image,
//! the eye regions handed in by an external eye locator and the circles
//! reported back for them.

mod error;
mod geometry;
mod image;
mod logger;

pub use error::ImageError;
pub use geometry::{Circle, Rect};
pub use image::{luma_from_rgb, PixelFormat, SourceImage};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
