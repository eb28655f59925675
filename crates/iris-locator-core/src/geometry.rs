use serde::{Deserialize, Serialize};

/// Axis-aligned eye region in source-image pixel coordinates.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when the rectangle lies fully inside an image of the given size.
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        let right = self.x.checked_add(self.width);
        let bottom = self.y.checked_add(self.height);
        matches!((right, bottom), (Some(r), Some(b)) if r <= image_width && b <= image_height)
    }

    /// Geometric center in region-local coordinates.
    #[inline]
    pub fn local_center(&self) -> (f32, f32) {
        (self.width as f32 * 0.5, self.height as f32 * 0.5)
    }
}

/// Circle in region-local pixel coordinates (relative to the ROI top-left).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
}

impl Circle {
    pub const fn new(center_x: f32, center_y: f32, radius: f32) -> Self {
        Self {
            center_x,
            center_y,
            radius,
        }
    }

    /// Euclidean distance from the circle center to `(x, y)`.
    #[inline]
    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        let dx = self.center_x - x;
        let dy = self.center_y - y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Same circle expressed in source-image coordinates.
    pub fn to_image(&self, roi: &Rect) -> Circle {
        Circle {
            center_x: self.center_x + roi.x as f32,
            center_y: self.center_y + roi.y as f32,
            radius: self.radius,
        }
    }
}
