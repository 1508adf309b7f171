//! File system access behind a trait.
//!
//! All disk access in the shell goes through [`FileStore`] so session and
//! viewer logic can be tested against an in-memory store. [`OsFileStore`]
//! is the real implementation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

/// Extensions recognized as viewable images (lowercase, without dot).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

/// Errors from file store operations.
#[derive(Debug, Error)]
pub enum FileSystemError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to delete {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Check if a path has a recognized image extension (case-insensitive).
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Sort paths the way the viewer presents them: case-insensitive by full
/// path, with byte order as a tiebreak so the result is total.
pub fn sort_paths(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| {
        let ka = a.to_string_lossy().to_lowercase();
        let kb = b.to_string_lossy().to_lowercase();
        ka.cmp(&kb).then_with(|| a.cmp(b))
    });
}

/// Abstraction over the disk operations the shell needs.
pub trait FileStore {
    /// Read a whole file.
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, FileSystemError>;

    /// Write a whole file, replacing any existing content.
    fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<(), FileSystemError>;

    /// Delete a file.
    fn delete(&self, path: &Path) -> Result<(), FileSystemError>;

    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// List image files directly inside a directory (no recursion),
    /// sorted with [`sort_paths`]. Either the complete listing is returned
    /// or the scan fails; there are no partial results.
    fn list_images(&self, dir: &Path) -> Result<Vec<PathBuf>, FileSystemError>;
}

/// [`FileStore`] backed by the real file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileStore;

impl FileStore for OsFileStore {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, FileSystemError> {
        fs::read(path).map_err(|source| FileSystemError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<(), FileSystemError> {
        fs::write(path, bytes).map_err(|source| FileSystemError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn delete(&self, path: &Path) -> Result<(), FileSystemError> {
        fs::remove_file(path).map_err(|source| FileSystemError::Delete {
            path: path.to_path_buf(),
            source,
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_images(&self, dir: &Path) -> Result<Vec<PathBuf>, FileSystemError> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| FileSystemError::Scan {
                path: dir.to_path_buf(),
                source: e.into(),
            })?;
            if entry.file_type().is_file() && is_image_path(entry.path()) {
                paths.push(entry.into_path());
            }
        }
        sort_paths(&mut paths);
        Ok(paths)
    }
}
