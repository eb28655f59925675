//! Region extraction: crop one eye ROI out of the source as 8-bit luminance.

use image::{GrayImage, Luma};
use iris_locator_core::{PixelFormat, Rect, SourceImage};

use crate::SegmentError;

/// Crop `roi` from `src` into an owned grayscale buffer.
///
/// Multi-channel sources are mapped to luminance with BT.601 weights
/// (see [`iris_locator_core::luma_from_rgb`]).
pub fn extract_region(src: &SourceImage<'_>, roi: &Rect) -> Result<GrayImage, SegmentError> {
    if roi.is_empty() || !roi.fits_within(src.width(), src.height()) {
        return Err(SegmentError::InvalidRegion {
            roi: *roi,
            image_width: src.width(),
            image_height: src.height(),
        });
    }

    if src.format() == PixelFormat::Gray8 {
        let stride = src.width() as usize;
        let x0 = roi.x as usize;
        let w = roi.width as usize;
        let mut out = Vec::with_capacity(w * roi.height as usize);
        for row in roi.y as usize..(roi.y + roi.height) as usize {
            let start = row * stride + x0;
            out.extend_from_slice(&src.data()[start..start + w]);
        }
        return GrayImage::from_raw(roi.width, roi.height, out).ok_or(
            SegmentError::EmptyRegion {
                width: roi.width,
                height: roi.height,
            },
        );
    }

    Ok(GrayImage::from_fn(roi.width, roi.height, |x, y| {
        Luma([src.luma_at(roi.x + x, roi.y + y)])
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Vec<u8> {
        (0..height)
            .flat_map(|y| (0..width).map(move |x| (y * width + x) as u8))
            .collect()
    }

    #[test]
    fn crops_gray_rows() {
        let data = gradient(8, 6);
        let src = SourceImage::new(8, 6, PixelFormat::Gray8, &data).unwrap();
        let region = extract_region(&src, &Rect::new(2, 1, 3, 2)).unwrap();
        assert_eq!(region.dimensions(), (3, 2));
        assert_eq!(region.as_raw(), &vec![10, 11, 12, 18, 19, 20]);
    }

    #[test]
    fn converts_rgb_to_luma() {
        let data = [255u8, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let src = SourceImage::new(2, 2, PixelFormat::Rgb8, &data).unwrap();
        let region = extract_region(&src, &Rect::new(0, 0, 2, 2)).unwrap();
        assert_eq!(region.as_raw(), &vec![76, 150, 29, 255]);
    }

    #[test]
    fn out_of_bounds_roi_is_invalid() {
        let data = gradient(8, 6);
        let src = SourceImage::new(8, 6, PixelFormat::Gray8, &data).unwrap();
        let err = extract_region(&src, &Rect::new(6, 0, 3, 2)).unwrap_err();
        assert!(matches!(err, SegmentError::InvalidRegion { .. }));
    }

    #[test]
    fn zero_sized_roi_is_invalid() {
        let data = gradient(8, 6);
        let src = SourceImage::new(8, 6, PixelFormat::Gray8, &data).unwrap();
        let err = extract_region(&src, &Rect::new(0, 0, 0, 2)).unwrap_err();
        assert!(matches!(err, SegmentError::InvalidRegion { .. }));
    }
}
