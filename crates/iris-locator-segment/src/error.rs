use iris_locator_core::{ImageError, Rect};

/// Per-region failure. Never aborts a batch: the detector records it in the
/// slot of the offending region and moves on.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SegmentError {
    #[error(
        "region {roi:?} does not fit inside the {image_width}x{image_height} source image"
    )]
    InvalidRegion {
        roi: Rect,
        image_width: u32,
        image_height: u32,
    },

    #[error("region of {width}x{height} pixels cannot be filtered")]
    EmptyRegion { width: u32, height: u32 },

    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Rejected pipeline configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("{field} must be {requirement} (got {value})")]
    OutOfRange {
        field: &'static str,
        requirement: &'static str,
        value: f64,
    },

    #[error("min radius coefficient {min} exceeds max radius coefficient {max}")]
    RadiusBounds { min: f64, max: f64 },
}
