use serde::{Deserialize, Serialize};

use crate::ImageError;

/// Channel layout of an 8-bit, tightly packed source buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    Gray8,
    GrayAlpha8,
    Rgb8,
    Rgba8,
    /// Blue-green-red byte order, as produced by OpenCV-style decoders.
    Bgr8,
}

impl PixelFormat {
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::GrayAlpha8 => 2,
            PixelFormat::Rgb8 | PixelFormat::Bgr8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// Borrowed, immutable view of a decoded photograph.
///
/// Row-major, no padding between rows: `data.len() == width * height * channels`.
#[derive(Clone, Copy, Debug)]
pub struct SourceImage<'a> {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: &'a [u8],
}

impl<'a> SourceImage<'a> {
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: &'a [u8],
    ) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidDimensions { width, height });
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(format.channels()))
            .ok_or(ImageError::InvalidDimensions { width, height })?;
        if data.len() != expected {
            return Err(ImageError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Wrap a buffer described only by its channel count (1, 2, 3 or 4).
    ///
    /// Three channels are interpreted as RGB.
    pub fn from_channels(
        width: u32,
        height: u32,
        channels: u8,
        data: &'a [u8],
    ) -> Result<Self, ImageError> {
        let format = match channels {
            1 => PixelFormat::Gray8,
            2 => PixelFormat::GrayAlpha8,
            3 => PixelFormat::Rgb8,
            4 => PixelFormat::Rgba8,
            _ => return Err(ImageError::UnsupportedChannels { channels }),
        };
        Self::new(width, height, format, data)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Luminance of pixel `(x, y)`. Caller guarantees the coordinate is in bounds.
    #[inline]
    pub fn luma_at(&self, x: u32, y: u32) -> u8 {
        let ch = self.format.channels();
        let idx = (y as usize * self.width as usize + x as usize) * ch;
        let px = &self.data[idx..idx + ch];
        match self.format {
            PixelFormat::Gray8 | PixelFormat::GrayAlpha8 => px[0],
            PixelFormat::Rgb8 | PixelFormat::Rgba8 => luma_from_rgb(px[0], px[1], px[2]),
            PixelFormat::Bgr8 => luma_from_rgb(px[2], px[1], px[0]),
        }
    }
}

/// ITU-R BT.601 luma (0.299 R + 0.587 G + 0.114 B) in 14-bit fixed point.
#[inline]
pub fn luma_from_rgb(r: u8, g: u8, b: u8) -> u8 {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    const HALF: u32 = 1 << 13;
    ((R * r as u32 + G * g as u32 + B * b as u32 + HALF) >> 14) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffer() {
        let data = vec![0u8; 11];
        let err = SourceImage::new(2, 2, PixelFormat::Rgb8, &data).unwrap_err();
        assert_eq!(
            err,
            ImageError::InvalidBuffer {
                expected: 12,
                got: 11
            }
        );
    }

    #[test]
    fn rejects_zero_dimensions() {
        let err = SourceImage::new(0, 4, PixelFormat::Gray8, &[]).unwrap_err();
        assert_eq!(
            err,
            ImageError::InvalidDimensions {
                width: 0,
                height: 4
            }
        );
    }

    #[test]
    fn unknown_channel_count_is_unsupported() {
        let data = vec![0u8; 5 * 4];
        let err = SourceImage::from_channels(2, 2, 5, &data).unwrap_err();
        assert_eq!(err, ImageError::UnsupportedChannels { channels: 5 });
    }

    #[test]
    fn luma_weights_match_bt601() {
        assert_eq!(luma_from_rgb(0, 0, 0), 0);
        assert_eq!(luma_from_rgb(255, 255, 255), 255);
        assert_eq!(luma_from_rgb(255, 0, 0), 76);
        assert_eq!(luma_from_rgb(0, 255, 0), 150);
        assert_eq!(luma_from_rgb(0, 0, 255), 29);
    }

    #[test]
    fn bgr_and_rgb_agree_on_the_same_colour() {
        let rgb = [10u8, 200, 30];
        let bgr = [30u8, 200, 10];
        let a = SourceImage::new(1, 1, PixelFormat::Rgb8, &rgb).unwrap();
        let b = SourceImage::new(1, 1, PixelFormat::Bgr8, &bgr).unwrap();
        assert_eq!(a.luma_at(0, 0), b.luma_at(0, 0));
    }

    #[test]
    fn gray_alpha_ignores_alpha() {
        let data = [17u8, 0, 90, 255];
        let img = SourceImage::new(2, 1, PixelFormat::GrayAlpha8, &data).unwrap();
        assert_eq!(img.luma_at(0, 0), 17);
        assert_eq!(img.luma_at(1, 0), 90);
    }
}
