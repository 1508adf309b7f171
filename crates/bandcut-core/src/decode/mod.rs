//! Image decoding for Bandcut.
//!
//! This module provides functionality for:
//! - Decoding images in any supported container format (JPEG, PNG, GIF,
//!   WebP, BMP), sniffed from the bytes
//! - Reading and applying the EXIF orientation tag
//!
//! GIF is decode-only: animated GIFs yield their first frame and edits are
//! saved in a different format (see [`crate::encode::OutputFormat`]).

mod reader;
mod types;

pub use reader::decode_image;
pub use types::{DecodeError, Orientation};
