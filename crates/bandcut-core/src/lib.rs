//! Bandcut Core - Image engine
//!
//! This crate provides the core image functionality for Bandcut: decoding
//! with EXIF orientation, band cutout (removing a vertical or horizontal
//! strip and joining the remainder), fit-inside downscaling, viewport
//! mapping, drag selection, and re-encoding to common formats.

pub mod decode;
pub mod encode;
pub mod raster;
pub mod selection;
pub mod transform;
pub mod viewport;

pub use decode::{decode_image, DecodeError};
pub use encode::{encode_image, EncodeError, OutputFormat};
pub use raster::RasterImage;
pub use selection::{SelectionController, SelectionPhase};
pub use transform::{cutout, fit_within, FilterType, TransformError};
pub use viewport::{contain_rect, to_normalized, DisplayRect, Point, Size};

/// Axis along which a band selection runs.
///
/// A `Vertical` band spans the full image height and is bounded on the
/// x-axis; removing it narrows the image. A `Horizontal` band spans the
/// full width and is bounded on the y-axis; removing it shortens the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum Axis {
    /// Band bounded on the x-axis (a range of columns).
    #[default]
    Vertical,
    /// Band bounded on the y-axis (a range of rows).
    Horizontal,
}

impl Axis {
    /// The other axis.
    pub fn toggled(self) -> Self {
        match self {
            Axis::Vertical => Axis::Horizontal,
            Axis::Horizontal => Axis::Vertical,
        }
    }
}

/// A committed band selection in normalized coordinates.
///
/// `start` and `end` are fractions of the bounded dimension (0.0 to 1.0)
/// with `start <= end`. The constructor enforces both: values are clamped
/// to the unit interval and reordered if given backwards, so a right-to-left
/// drag produces the same range as its left-to-right mirror.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SelectionRange {
    /// Lower edge of the band (0.0 to 1.0).
    pub start: f64,
    /// Upper edge of the band (0.0 to 1.0).
    pub end: f64,
    /// Axis the band is bounded on.
    pub axis: Axis,
}

impl SelectionRange {
    /// Create a range from two drag endpoints, clamping and ordering them.
    pub fn new(a: f64, b: f64, axis: Axis) -> Self {
        let a = a.clamp(0.0, 1.0);
        let b = b.clamp(0.0, 1.0);
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        Self { start, end, axis }
    }

    /// Fraction of the bounded dimension the band covers.
    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    /// Check if the band covers the entire bounded dimension.
    pub fn is_full(&self) -> bool {
        self.start <= 0.0 && self.end >= 1.0
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: A constructed range is always ordered and inside [0, 1].
        #[test]
        fn prop_range_ordered_and_clamped(a in -2.0f64..=3.0, b in -2.0f64..=3.0) {
            let range = SelectionRange::new(a, b, Axis::Vertical);

            prop_assert!(range.start <= range.end);
            prop_assert!(range.start >= 0.0 && range.start <= 1.0);
            prop_assert!(range.end >= 0.0 && range.end <= 1.0);
        }

        /// Property: Endpoint order does not matter.
        #[test]
        fn prop_range_order_independent(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let forward = SelectionRange::new(a, b, Axis::Horizontal);
            let reverse = SelectionRange::new(b, a, Axis::Horizontal);

            prop_assert_eq!(forward.start, reverse.start);
            prop_assert_eq!(forward.end, reverse.end);
        }
    }
}
