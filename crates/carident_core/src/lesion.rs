//! Lesion bounding boxes.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box around one connected lesion region.
///
/// Coordinates are in the pixel space of the mask's native resolution.
/// `confidence` is the mean mask probability inside the box scaled to a
/// percentage and rounded to two decimals; `area` is the pixel count of the
/// connected region, always strictly above the configured minimum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LesionBox {
    /// 1-based identifier, stable per extraction call.
    pub id: u32,
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Box width in pixels.
    pub width: u32,
    /// Box height in pixels.
    pub height: u32,
    /// Mean in-box probability as a percentage, rounded to 2 decimals.
    pub confidence: f64,
    /// Pixel count of the lesion region.
    pub area: u32,
}

impl LesionBox {
    /// Check whether `(x, y)` lies inside the box.
    #[must_use]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}
