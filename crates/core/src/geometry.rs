//! Rectangle geometry for screenshot regions.
//!
//! Selections are drawn in logical (CSS) pixels and converted to device
//! pixels before they ever touch image data. [`PixelRect`] is always in
//! device-pixel units; [`PixelRect::clamp_to`] enforces the invariant that a
//! rectangle lies fully inside its source image before cropping.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in device pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Create a new rectangle from device-pixel coordinates.
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Convert a rectangle from logical (CSS) pixels to device pixels.
    ///
    /// All four fields are multiplied by `scale` (the page's device pixel
    /// ratio) and rounded to the nearest integer. Negative inputs clamp to
    /// zero; a non-positive scale is treated as `1.0`.
    pub fn from_logical(left: f64, top: f64, width: f64, height: f64, scale: f64) -> Self {
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let to_px = |v: f64| (v * scale).round().max(0.0) as u32;
        Self {
            left: to_px(left),
            top: to_px(top),
            width: to_px(width),
            height: to_px(height),
        }
    }

    /// One past the rightmost column covered by the rectangle.
    pub fn right(&self) -> u32 {
        self.left + self.width
    }

    /// One past the bottommost row covered by the rectangle.
    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }

    /// Whether the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Clamp the rectangle so it lies fully inside an image of the given
    /// dimensions.
    ///
    /// The origin is pulled back first (preserving the requested size where
    /// possible), then the size is shrunk to fit. Rounding overshoot from the
    /// logical-to-device conversion is silently corrected rather than
    /// rejected. The result always satisfies `left + width <= image_width`
    /// and `top + height <= image_height`.
    pub fn clamp_to(self, image_width: u32, image_height: u32) -> Self {
        let left = self.left.min(image_width.saturating_sub(self.width));
        let top = self.top.min(image_height.saturating_sub(self.height));
        Self {
            left,
            top,
            width: self.width.min(image_width - left),
            height: self.height.min(image_height - top),
        }
    }
}
