//! Bandcut Shell - Viewer session layer
//!
//! This crate drives the desktop side of Bandcut on top of `bandcut-core`:
//! the directory-backed image session, background preview rendering,
//! keyboard dispatch with double-press delete confirmation, the external
//! editor contract, and the [`ViewerSession`] that ties them together over
//! a pluggable filesystem.

pub mod editor;
pub mod fs;
pub mod preview;
pub mod session;
pub mod shortcut;
pub mod viewer;

pub use editor::{EditorCallback, EditorError, ExternalEditor};
pub use fs::{FileStore, FileSystemError, OsFileStore, IMAGE_EXTENSIONS};
pub use preview::{PreviewCoordinator, PreviewEvent, PreviewRequest, PreviewSequencer, RequestId};
pub use session::{DirectorySession, ImageEntry};
pub use shortcut::{
    Clock, DoublePress, DoublePressDetector, Key, KeyChord, Modifiers, ShortcutDispatcher,
    SystemClock, ViewerAction,
};
pub use viewer::{ActionOutcome, ViewerConfig, ViewerError, ViewerSession};
