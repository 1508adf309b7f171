//! Multi-format image encoding.
//!
//! Re-encodes a pixel buffer into the chosen container format. Quality
//! applies to lossy formats only; PNG, WebP (lossless encoder) and BMP
//! ignore it.

use std::io::Cursor;

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use thiserror::Error;

use super::OutputFormat;
use crate::raster::RasterImage;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("{format:?} encoding failed: {message}")]
    EncodingFailed {
        format: OutputFormat,
        message: String,
    },
}

/// Encode an image to bytes in the given format.
///
/// # Arguments
///
/// * `image` - The image to encode
/// * `format` - Target container format
/// * `quality` - Quality for lossy formats (1-100, clamped); ignored for
///   lossless formats
///
/// # Returns
///
/// Encoded file bytes on success, or an error if the input is malformed
/// or the encoder fails.
///
/// # Quality Guidelines
///
/// * 90-100: High quality, suitable for archival or further editing
/// * 80-90: Good quality, recommended for most uses
/// * 60-80: Medium quality, acceptable for web/social media
/// * Below 60: Low quality, visible artifacts
pub fn encode_image(
    image: &RasterImage,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    // Validate dimensions
    if image.width == 0 || image.height == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: image.width,
            height: image.height,
        });
    }

    // Validate pixel data length
    let expected_len = (image.width as usize) * (image.height as usize) * 3;
    if image.pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: image.pixels.len(),
        });
    }

    // Clamp quality to valid range (1-100)
    let quality = quality.clamp(1, 100);

    let mut buffer = Cursor::new(Vec::new());
    let written = match format {
        OutputFormat::Jpeg => JpegEncoder::new_with_quality(&mut buffer, quality).write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgb8,
        ),
        OutputFormat::Png => PngEncoder::new(&mut buffer).write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgb8,
        ),
        OutputFormat::WebP => WebPEncoder::new_lossless(&mut buffer).write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgb8,
        ),
        OutputFormat::Bmp => BmpEncoder::new(&mut buffer).write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgb8,
        ),
    };

    written.map_err(|e| EncodeError::EncodingFailed {
        format,
        message: e.to_string(),
    })?;

    Ok(buffer.into_inner())
}


// ============================================================================
// Property-Based Tests
// ============================================================================
