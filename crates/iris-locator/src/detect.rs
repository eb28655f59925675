use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use ::image::{ColorType, DynamicImage, ImageReader};

use crate::core::{ImageError, PixelFormat, Rect, SourceImage};
use crate::debug_png::PngDebugSink;
use crate::io::{IrisDetectConfig, IrisReport};
use crate::segment::{
    EventLog, EventSink, IrisDetector, LogSink, ParamsError, RoiOutcome, SegmentParams,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error(transparent)]
    Source(#[from] ImageError),

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: ::image::ImageError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Pixel layout the detector can read `img` in without conversion.
///
/// Returns `None` for 16-bit and floating point images.
pub fn source_format(img: &DynamicImage) -> Option<PixelFormat> {
    match img.color() {
        ColorType::L8 => Some(PixelFormat::Gray8),
        ColorType::La8 => Some(PixelFormat::GrayAlpha8),
        ColorType::Rgb8 => Some(PixelFormat::Rgb8),
        ColorType::Rgba8 => Some(PixelFormat::Rgba8),
        _ => None,
    }
}

/// `img` as-is when its layout is supported, otherwise converted to RGBA8.
fn readable(img: &DynamicImage) -> (Cow<'_, DynamicImage>, PixelFormat) {
    match source_format(img) {
        Some(format) => (Cow::Borrowed(img), format),
        None => (
            Cow::Owned(DynamicImage::ImageRgba8(img.to_rgba8())),
            PixelFormat::Rgba8,
        ),
    }
}

/// Run `detector` on every region of a decoded image.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(detector, img, rois),
        fields(width = img.width(), height = img.height(), rois = rois.len())
    )
)]
pub fn detect_irises_with(
    detector: &IrisDetector,
    img: &DynamicImage,
    rois: &[Rect],
) -> Result<Vec<RoiOutcome>, DetectError> {
    let (img, format) = readable(img);
    let src = SourceImage::new(img.width(), img.height(), format, img.as_bytes())?;
    Ok(detector.detect(&src, rois))
}

/// Convenience overload building a detector from `params`.
pub fn detect_irises(
    img: &DynamicImage,
    rois: &[Rect],
    params: SegmentParams,
) -> Result<Vec<RoiOutcome>, DetectError> {
    let detector = IrisDetector::new(params)?;
    detect_irises_with(&detector, img, rois)
}

/// Decode an image file from disk.
pub fn load_image(path: impl AsRef<Path>) -> Result<DynamicImage, DetectError> {
    let path = path.as_ref();
    let decode_err = |source| DetectError::Decode {
        path: path.display().to_string(),
        source,
    };
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(decode_err)
}

/// Run a whole [`IrisDetectConfig`]: decode the image, detect every region and
/// assemble the report. With `collect_events` the per-stage events are kept in
/// the report.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(cfg), fields(image = %cfg.image_path)))]
pub fn run_config(cfg: &IrisDetectConfig, collect_events: bool) -> Result<IrisReport, DetectError> {
    let img = load_image(&cfg.image_path)?;

    let events = Arc::new(EventLog::new());
    let sink: Arc<dyn EventSink> = if collect_events {
        Arc::new((LogSink, events.clone()))
    } else {
        Arc::new(LogSink)
    };
    let mut detector = IrisDetector::new(cfg.params.clone())?.with_event_sink(sink);
    if let Some(dir) = &cfg.debug_dir {
        detector = detector.with_debug_sink(Arc::new(PngDebugSink::new(dir)?));
    }

    let outcomes = detect_irises_with(&detector, &img, &cfg.rois)?;
    let mut report = IrisReport::new(
        &cfg.image_path,
        img.width(),
        img.height(),
        &cfg.rois,
        &outcomes,
    );
    report.events = events.take();
    log::info!(
        "{}: {}/{} regions with an iris",
        cfg.image_path,
        report.found(),
        report.regions.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{GrayImage, ImageBuffer, Luma, Rgb};

    #[test]
    fn wide_images_are_converted() {
        let wide: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_pixel(8, 8, Luma([1000]));
        let img = DynamicImage::ImageLuma16(wide);
        assert_eq!(source_format(&img), None);
        let (converted, format) = readable(&img);
        assert_eq!(format, PixelFormat::Rgba8);
        assert_eq!(converted.as_bytes().len(), 8 * 8 * 4);
    }

    #[test]
    fn rgb_images_are_read_in_place() {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(4, 4, Rgb([1, 2, 3])));
        assert_eq!(source_format(&img), Some(PixelFormat::Rgb8));
        assert!(matches!(readable(&img).0, Cow::Borrowed(_)));
    }

    #[test]
    fn out_of_bounds_regions_fail_individually() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(50, 50, Luma([128])));
        let rois = [Rect::new(0, 0, 50, 50), Rect::new(40, 40, 20, 20)];
        let outcomes = detect_irises(&img, &rois, SegmentParams::default()).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0], Ok(None));
        assert!(outcomes[1].is_err());
    }

    #[test]
    fn invalid_params_are_rejected_up_front() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(10, 10));
        let mut params = SegmentParams::default();
        params.hough.accumulator_scale = 0.5;
        assert!(matches!(
            detect_irises(&img, &[], params),
            Err(DetectError::Params(_))
        ));
    }
}
