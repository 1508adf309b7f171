//! Output format selection.

use std::ffi::OsStr;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Formats Bandcut can write.
///
/// GIF is intentionally absent: it can be decoded but edits are written as
/// PNG instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
    Bmp,
}

/// Source extension to default output format. Unlisted extensions fall
/// back to JPEG.
const EXTENSION_FORMATS: &[(&str, OutputFormat)] = &[
    ("jpg", OutputFormat::Jpeg),
    ("jpeg", OutputFormat::Jpeg),
    ("png", OutputFormat::Png),
    ("webp", OutputFormat::WebP),
    ("bmp", OutputFormat::Bmp),
    ("gif", OutputFormat::Png),
];

impl OutputFormat {
    /// Look up the output format for a file extension.
    ///
    /// Matching is case-insensitive and tolerates a leading dot. Unknown
    /// extensions map to `Jpeg`.
    pub fn for_extension(extension: &str) -> OutputFormat {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        EXTENSION_FORMATS
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, format)| *format)
            .unwrap_or(OutputFormat::Jpeg)
    }

    /// Look up the output format for a destination path.
    ///
    /// Paths without an extension map to `Jpeg`.
    pub fn for_path(path: &Path) -> OutputFormat {
        path.extension()
            .and_then(OsStr::to_str)
            .map(Self::for_extension)
            .unwrap_or(OutputFormat::Jpeg)
    }

    /// Canonical file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
            OutputFormat::Bmp => "bmp",
        }
    }

    /// Whether encoding discards information. Quality settings only apply
    /// to lossy formats.
    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }
}
