//! Viewport geometry for on-screen display.
//!
//! An image shown inside a viewport is scaled to fit entirely within it
//! while preserving aspect ratio, then centered. The resulting display
//! rectangle is the reference frame for converting pointer positions into
//! normalized image coordinates.
//!
//! All values are in logical display units (f64), not image pixels.

use serde::{Deserialize, Serialize};

use crate::Axis;

/// A pointer position in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Dimensions of a viewport in display units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// The rectangle an image occupies inside a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayRect {
    /// Left edge in viewport coordinates.
    pub left: f64,
    /// Top edge in viewport coordinates.
    pub top: f64,
    /// Displayed width.
    pub width: f64,
    /// Displayed height.
    pub height: f64,
}

impl DisplayRect {
    /// Right edge in viewport coordinates.
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge in viewport coordinates.
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Check if a point lies inside the rectangle. Edges are inclusive.
    pub fn contains(&self, point: Point) -> bool {
        !self.is_empty()
            && point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }

    /// Check if the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Compute the rectangle an image occupies when fit inside a viewport.
///
/// The image is scaled by the smaller of the two axis ratios so it fits
/// entirely within the viewport with its aspect ratio preserved, then
/// centered on both axes. Images smaller than the viewport are scaled up.
///
/// # Arguments
///
/// * `viewport` - Viewport dimensions in display units
/// * `image_width` - Image width in pixels
/// * `image_height` - Image height in pixels
///
/// # Returns
///
/// The centered display rectangle. If the viewport or image has a zero
/// dimension, an empty rectangle at the origin is returned.
pub fn contain_rect(viewport: Size, image_width: u32, image_height: u32) -> DisplayRect {
    if viewport.width <= 0.0 || viewport.height <= 0.0 || image_width == 0 || image_height == 0 {
        return DisplayRect::default();
    }

    let scale = f64::min(
        viewport.width / image_width as f64,
        viewport.height / image_height as f64,
    );

    let width = image_width as f64 * scale;
    let height = image_height as f64 * scale;

    DisplayRect {
        left: (viewport.width - width) / 2.0,
        top: (viewport.height - height) / 2.0,
        width,
        height,
    }
}

/// Convert a pointer position to a normalized position along one axis.
///
/// For a vertical band the x coordinate is mapped against the rectangle's
/// horizontal extent; for a horizontal band the y coordinate is mapped
/// against its vertical extent. Positions outside the rectangle clamp to
/// 0.0 or 1.0, so a drag that leaves the image stays pinned to the edge.
///
/// Returns 0.0 if the rectangle is empty.
pub fn to_normalized(point: Point, rect: &DisplayRect, axis: Axis) -> f64 {
    if rect.is_empty() {
        return 0.0;
    }

    let fraction = match axis {
        Axis::Vertical => (point.x - rect.left) / rect.width,
        Axis::Horizontal => (point.y - rect.top) / rect.height,
    };

    fraction.clamp(0.0, 1.0)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
