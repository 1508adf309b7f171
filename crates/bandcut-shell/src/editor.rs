//! Contract for handing an image to an external editor.
//!
//! The viewer does not interpret what the editor does to the pixels. It sends
//! the current working image out and, when the callback fires, adopts the
//! returned bytes as the new working image (or reports the failure).

use std::sync::Arc;

use bandcut_core::RasterImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    /// The user backed out of the edit; the working image is unchanged.
    #[error("Edit was cancelled")]
    Cancelled,
    /// The editor could not produce a result.
    #[error("External editor failed: {0}")]
    Failed(String),
}

/// Completion callback invoked once the editor finishes or gives up.
/// Carries encoded image bytes on success.
pub type EditorCallback = Box<dyn FnOnce(Result<Vec<u8>, EditorError>) + Send>;

/// An external program or component that can rework an image.
///
/// Implementations are free to run out of process or on another thread;
/// the callback is the only channel back.
pub trait ExternalEditor {
    fn edit(&self, image: Arc<RasterImage>, done: EditorCallback);
}
