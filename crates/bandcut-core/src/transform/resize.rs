//! Aspect-preserving downscale for previews and export.
//!
//! `fit_within` only ever shrinks: an image already inside the bounding box
//! is returned unchanged. Resampling uses the `image` crate's algorithms.

use serde::{Deserialize, Serialize};

use crate::raster::RasterImage;

/// Filter type for image resizing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Downscale an image to fit inside a bounding box, preserving aspect ratio.
///
/// The scale factor is the smaller of the two axis ratios, so both output
/// dimensions end up within the bounds. Output dimensions are rounded and
/// clamped to at least 1 pixel.
///
/// # Arguments
///
/// * `image` - The source image
/// * `max_width` - Bounding box width in pixels
/// * `max_height` - Bounding box height in pixels
/// * `filter` - Interpolation filter to use
///
/// # Returns
///
/// A new image fitting inside `max_width x max_height`. Images already
/// inside the box are returned unchanged (this function never upscales).
/// Zero bounds are treated as 1.
pub fn fit_within(
    image: &RasterImage,
    max_width: u32,
    max_height: u32,
    filter: FilterType,
) -> RasterImage {
    let max_width = max_width.max(1);
    let max_height = max_height.max(1);

    if image.width <= max_width && image.height <= max_height {
        return image.clone();
    }

    let (new_width, new_height) = fit_dimensions(image.width, image.height, max_width, max_height);

    let Some(rgb_image) = image.to_rgb_image() else {
        // Pixel length is validated at construction; a mismatched buffer
        // cannot be resampled, so hand it back untouched.
        return image.clone();
    };

    let resized =
        image::imageops::resize(&rgb_image, new_width, new_height, filter.to_image_filter());
    RasterImage::from_rgb_image(resized)
}

/// Calculate dimensions that fit the bounds while preserving aspect ratio.
fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let ratio = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );

    let new_width = ((width as f64) * ratio).round() as u32;
    let new_height = ((height as f64) * ratio).round() as u32;

    (new_width.max(1), new_height.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_image(width: u32, height: u32) -> RasterImage {
        RasterImage::new(width, height, vec![128u8; (width * height * 3) as usize])
    }

    #[test]
    fn test_fit_within_downscales_landscape() {
        let img = gray_image(4000, 3000);
        let result = fit_within(&img, 1920, 1920, FilterType::Bilinear);

        assert_eq!(result.width, 1920);
        assert_eq!(result.height, 1440);
    }

    #[test]
    fn test_fit_within_downscales_portrait() {
        let img = gray_image(3000, 4000);
        let result = fit_within(&img, 1920, 1920, FilterType::Bilinear);

        assert_eq!(result.width, 1440);
        assert_eq!(result.height, 1920);
    }

    #[test]
    fn test_fit_within_never_upscales() {
        let img = gray_image(500, 500);
        let result = fit_within(&img, 4096, 4096, FilterType::Bilinear);

        assert_eq!(result.width, 500);
        assert_eq!(result.height, 500);
        assert_eq!(result.pixels, img.pixels);
    }

    #[test]
    fn test_fit_within_exact_bounds_unchanged() {
        let img = gray_image(1920, 1080);
        let result = fit_within(&img, 1920, 1080, FilterType::Bilinear);

        assert_eq!(result.width, 1920);
        assert_eq!(result.height, 1080);
    }

    #[test]
    fn test_fit_within_one_axis_over() {
        // Width fits, height does not
        let img = gray_image(100, 400);
        let result = fit_within(&img, 200, 200, FilterType::Bilinear);

        assert_eq!(result.height, 200);
        assert_eq!(result.width, 50);
    }

    #[test]
    fn test_fit_within_rectangular_bounds() {
        let img = gray_image(1000, 1000);
        let result = fit_within(&img, 300, 100, FilterType::Bilinear);

        assert_eq!(result.width, 100);
        assert_eq!(result.height, 100);
    }

    #[test]
    fn test_fit_within_extreme_aspect_clamps_to_one() {
        // 1000:1 strip scaled way down would round the short side to 0
        let img = gray_image(1000, 1);
        let result = fit_within(&img, 10, 10, FilterType::Nearest);

        assert_eq!(result.width, 10);
        assert_eq!(result.height, 1);
    }

    #[test]
    fn test_fit_within_zero_bounds_treated_as_one() {
        let img = gray_image(100, 100);
        let result = fit_within(&img, 0, 0, FilterType::Nearest);

        assert_eq!(result.width, 1);
        assert_eq!(result.height, 1);
    }

    #[test]
    fn test_filter_type_conversion() {
        assert!(matches!(
            FilterType::Nearest.to_image_filter(),
            image::imageops::FilterType::Nearest
        ));
        assert!(matches!(
            FilterType::Bilinear.to_image_filter(),
            image::imageops::FilterType::Triangle
        ));
        assert!(matches!(
            FilterType::Lanczos3.to_image_filter(),
            image::imageops::FilterType::Lanczos3
        ));
    }

    #[test]
    fn test_fit_within_preserves_flat_color() {
        let img = gray_image(600, 400);
        let result = fit_within(&img, 150, 150, FilterType::Bilinear);

        // Resampling a flat image must not invent new values
        assert!(result.pixels.iter().all(|&p| p == 128));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
