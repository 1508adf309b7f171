//! Image transform operations.
//!
//! This module provides the destructive pixel operations of the engine:
//! - Band cutout (remove a vertical or horizontal strip and close the gap)
//! - Fit-inside downscaling for previews and export
//!
//! All operations take the source image by reference and return a new
//! image; inputs are never modified.

mod cutout;
mod resize;

pub use cutout::{cutout, TransformError};
pub use resize::{fit_within, FilterType};
