//! Band cutout: remove a strip of the image and join the remainder.
//!
//! The band is specified in normalized coordinates along one axis. A
//! vertical band covers a range of columns across the full image height;
//! removing it narrows the image and the columns right of the band shift
//! left to close the gap. A horizontal band is the row analog and shortens
//! the image.
//!
//! # Coordinate System
//!
//! Normalized positions (0.0 to 1.0) are converted to pixel bounds by
//! rounding half away from zero, so a band edge lands on the nearest pixel
//! boundary. The removed band is half-open: `[start_px, end_px)`.

use thiserror::Error;

use crate::raster::RasterImage;
use crate::{Axis, SelectionRange};

/// Errors from the band cutout operation.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The band covers every pixel of the bounded dimension.
    #[error("Selection covers the entire image")]
    EntireImageSelected,

    /// Removing the band would leave no pixels.
    #[error("Cutout would produce an empty image")]
    EmptyResult,
}

/// Remove the selected band from an image and join the remaining parts.
///
/// # Arguments
///
/// * `image` - Source image
/// * `range` - Band to remove, normalized along `range.axis`
///
/// # Returns
///
/// A new image with the band removed. The input is never modified.
///
/// # Errors
///
/// Returns [`TransformError::EntireImageSelected`] if the band's pixel
/// bounds cover the whole bounded dimension, and
/// [`TransformError::EmptyResult`] if the output would have a zero
/// dimension.
///
/// # Behavior
///
/// - Pixel bounds are `round(position * dimension)`, clamped to the image
/// - A band that rounds to zero width returns a copy of the input
/// - Kept pixels are byte-identical to the input, only relocated
pub fn cutout(image: &RasterImage, range: &SelectionRange) -> Result<RasterImage, TransformError> {
    let dimension = match range.axis {
        Axis::Vertical => image.width,
        Axis::Horizontal => image.height,
    };

    let (start_px, end_px) = band_bounds(range, dimension);

    if start_px == 0 && end_px == dimension {
        return Err(TransformError::EntireImageSelected);
    }

    if start_px == end_px {
        return Ok(image.clone());
    }

    let removed = end_px - start_px;
    if dimension - removed == 0 {
        return Err(TransformError::EmptyResult);
    }

    let result = match range.axis {
        Axis::Vertical => remove_columns(image, start_px, end_px),
        Axis::Horizontal => remove_rows(image, start_px, end_px),
    };
    Ok(result)
}

/// Convert a normalized range to pixel bounds along a dimension.
///
/// Rounds half away from zero (f64 `round`) and clamps to the image, with
/// `start <= end` guaranteed.
fn band_bounds(range: &SelectionRange, dimension: u32) -> (u32, u32) {
    let scale = dimension as f64;
    let start_px = (range.start.clamp(0.0, 1.0) * scale).round() as u32;
    let end_px = (range.end.clamp(0.0, 1.0) * scale).round() as u32;

    let start_px = start_px.min(dimension);
    let end_px = end_px.min(dimension).max(start_px);
    (start_px, end_px)
}

/// Remove columns `[start, end)` and shift the columns right of the band left.
fn remove_columns(image: &RasterImage, start: u32, end: u32) -> RasterImage {
    let out_width = image.width - (end - start);
    let src_stride = (image.width as usize) * 3;
    let dst_stride = (out_width as usize) * 3;

    // Byte offsets of the band edges within a row
    let kept_left = (start as usize) * 3;
    let band_end = (end as usize) * 3;

    let mut output = vec![0u8; dst_stride * image.height as usize];
    for y in 0..image.height as usize {
        let src_row = &image.pixels[y * src_stride..(y + 1) * src_stride];
        let dst_row = &mut output[y * dst_stride..(y + 1) * dst_stride];
        dst_row[..kept_left].copy_from_slice(&src_row[..kept_left]);
        dst_row[kept_left..].copy_from_slice(&src_row[band_end..]);
    }

    RasterImage::new(out_width, image.height, output)
}

/// Remove rows `[start, end)` and shift the rows below the band up.
fn remove_rows(image: &RasterImage, start: u32, end: u32) -> RasterImage {
    let out_height = image.height - (end - start);
    let stride = (image.width as usize) * 3;

    let mut output = Vec::with_capacity(stride * out_height as usize);
    output.extend_from_slice(&image.pixels[..(start as usize) * stride]);
    output.extend_from_slice(&image.pixels[(end as usize) * stride..]);

    RasterImage::new(image.width, out_height, output)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
