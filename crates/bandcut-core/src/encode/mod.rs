//! Image encoding for save and export.
//!
//! This module provides functionality for:
//! - Re-encoding pixel buffers to JPEG, PNG, WebP (lossless) or BMP
//! - Choosing an output format from a destination path or source extension
//!
//! Saving always re-encodes from the working pixel buffer; the source
//! file's container is never patched in place.

mod format;
mod writer;

pub use format::OutputFormat;
pub use writer::{encode_image, EncodeError};
