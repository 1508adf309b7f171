//! The viewer session: one open directory, one working image, and the
//! machinery around them.
//!
//! [`ViewerSession`] wires the engine pieces together: the directory session
//! for navigation, the selection controller for band drags, the preview
//! coordinator for background renders, and the shortcut dispatcher plus the
//! double-press detector for input. The filesystem and the clock come in
//! through traits so every flow here is testable with fakes.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use bandcut_core::{
    contain_rect, cutout, decode_image, encode_image, Axis, DecodeError, EncodeError,
    OutputFormat, Point, RasterImage, SelectionController, SelectionRange, Size, TransformError,
};

use crate::fs::{FileStore, FileSystemError, OsFileStore};
use crate::preview::{PreviewCoordinator, PreviewEvent, PreviewRequest};
use crate::session::DirectorySession;
use crate::shortcut::{
    Clock, DoublePress, DoublePressDetector, KeyChord, ShortcutDispatcher, SystemClock,
    ViewerAction,
};

/// Tunable knobs for a viewer session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Longest edge of a rendered preview, in pixels.
    pub preview_max_edge: u32,
    /// JPEG quality used when saving without an explicit override.
    pub default_quality: u8,
    /// How long a destructive action stays armed waiting for its
    /// confirming second press.
    pub confirm_window: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            preview_max_edge: 1920,
            default_quality: 90,
            confirm_window: Duration::from_millis(500),
        }
    }
}

/// Umbrella error for viewer operations.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),
    /// The operation needs a loaded image and there is none.
    #[error("No image is loaded")]
    NoImage,
    /// The operation needs a committed selection and there is none.
    #[error("No committed selection to apply")]
    NoSelection,
}

/// What a dispatched key chord ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The chord is not bound to anything.
    Unbound,
    /// The action was recognized but there was nothing for it to act on.
    Ignored,
    Navigated,
    /// First delete press: waiting for the confirming second press.
    DeleteArmed,
    Deleted,
    SelectionCommitted,
    SelectionCancelled,
    AxisToggled,
    /// The caller should prompt for a destination and call `save_as`.
    SaveRequested,
    /// The caller should hand the working image to the external editor.
    EditRequested,
    Refreshed,
}

/// A directory viewer with band-removal editing.
///
/// Holds the working image (shared immutably via `Arc`), the session over
/// its directory, and the input plumbing. All mutation happens on the
/// caller's thread; only preview renders run elsewhere.
pub struct ViewerSession<S: FileStore = OsFileStore, C: Clock = SystemClock> {
    config: ViewerConfig,
    store: S,
    session: Option<DirectorySession>,
    working: Option<Arc<RasterImage>>,
    preview: Option<Arc<RasterImage>>,
    selection: SelectionController,
    coordinator: PreviewCoordinator,
    shortcuts: ShortcutDispatcher,
    confirm_delete: DoublePressDetector<C>,
    viewport: Size,
}

impl ViewerSession {
    /// Session backed by the real filesystem and clock.
    pub fn new(config: ViewerConfig) -> Self {
        Self::with_store(OsFileStore, SystemClock, config)
    }
}

impl<S: FileStore, C: Clock> ViewerSession<S, C> {
    /// Session with explicit collaborators, the constructor tests use.
    pub fn with_store(store: S, clock: C, config: ViewerConfig) -> Self {
        let coordinator = PreviewCoordinator::new(config.preview_max_edge);
        let confirm_delete = DoublePressDetector::with_clock(config.confirm_window, clock);
        Self {
            store,
            session: None,
            working: None,
            preview: None,
            selection: SelectionController::new(Axis::default()),
            coordinator,
            shortcuts: ShortcutDispatcher::with_defaults(),
            confirm_delete,
            viewport: Size::default(),
            config,
        }
    }

    /// Opens `path` and builds a session over its directory, with `path`
    /// as the current entry.
    ///
    /// # Errors
    ///
    /// Read, decode, and scan failures all surface here, and any failure
    /// leaves the previous state fully intact.
    pub fn open(&mut self, path: &Path) -> Result<(), ViewerError> {
        let bytes = self.store.read_bytes(path)?;
        let image = decode_image(&bytes)?;
        let session = DirectorySession::open(&self.store, path)?;
        self.session = Some(session);
        self.adopt_image(image);
        Ok(())
    }

    /// Records the viewport dimensions and lays the image out in them.
    ///
    /// A selection in progress survives a relayout; only its display
    /// geometry moves.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        if let Some(image) = &self.working {
            self.selection
                .set_display_rect(contain_rect(viewport, image.width, image.height));
        }
    }

    /// Steps the session cursor by `step` (wrapping) and loads the image
    /// it lands on.
    pub fn navigate(&mut self, step: isize) -> Result<(), ViewerError> {
        let next = self
            .session
            .as_mut()
            .and_then(|session| session.navigate(step))
            .map(|entry| entry.path().to_path_buf())
            .ok_or(ViewerError::NoImage)?;
        self.load_path(&next)
    }

    /// Deletes the current file and advances to its successor.
    ///
    /// The store delete runs first; if it fails the session is untouched.
    /// Only after the file is gone does the session reindex and the next
    /// image load.
    pub fn delete_current(&mut self) -> Result<(), ViewerError> {
        let path = self
            .session
            .as_ref()
            .and_then(|session| session.current_entry())
            .map(|entry| entry.path().to_path_buf())
            .ok_or(ViewerError::NoImage)?;
        self.store.delete(&path)?;
        if let Some(session) = self.session.as_mut() {
            session.remove(&path);
        }
        log::info!("deleted {}", path.display());

        let next = self
            .session
            .as_ref()
            .and_then(|session| session.current_entry())
            .map(|entry| entry.path().to_path_buf());
        match next {
            Some(next) => self.load_path(&next),
            None => {
                self.clear_image();
                Ok(())
            }
        }
    }

    /// Saves the working image to `path` using the configured quality.
    pub fn save_as(&mut self, path: &Path) -> Result<(), ViewerError> {
        self.save_as_with_quality(path, self.config.default_quality)
    }

    /// Saves the working image to `path`, picking the output format from
    /// the destination extension and re-encoding from the working pixels.
    ///
    /// The session refreshes afterwards so a file saved into the open
    /// directory appears in the listing.
    pub fn save_as_with_quality(&mut self, path: &Path, quality: u8) -> Result<(), ViewerError> {
        let image = self.working.as_ref().ok_or(ViewerError::NoImage)?;
        let format = OutputFormat::for_path(path);
        let bytes = encode_image(image, format, quality)?;
        self.store.write_bytes(path, &bytes)?;
        log::info!("saved {} ({} bytes)", path.display(), bytes.len());
        if let Some(session) = self.session.as_mut() {
            session.refresh(&self.store)?;
        }
        Ok(())
    }

    /// Removes the committed band from the working image.
    ///
    /// A full-range selection is rejected before any pixels move. On
    /// success the smaller image becomes the working image, the selection
    /// resets, and the stale preview is dropped.
    pub fn apply_cutout(&mut self) -> Result<(), ViewerError> {
        let image = self.working.clone().ok_or(ViewerError::NoImage)?;
        let range = self
            .selection
            .committed_range()
            .ok_or(ViewerError::NoSelection)?;
        if range.is_full() {
            return Err(TransformError::EntireImageSelected.into());
        }
        let result = cutout(&image, &range)?;
        self.adopt_image(result);
        Ok(())
    }

    /// Adopts external-editor output as the new working image.
    ///
    /// The bytes are decoded exactly like a file read; what the editor did
    /// to them is not interpreted. Undecodable bytes leave the current
    /// image in place.
    pub fn accept_edited_bytes(&mut self, bytes: &[u8]) -> Result<(), ViewerError> {
        let image = decode_image(bytes)?;
        self.adopt_image(image);
        Ok(())
    }

    /// Starts a band selection at a viewport point. Returns `false` when
    /// the press misses the displayed image or nothing is loaded.
    pub fn begin_selection(&mut self, point: Point) -> bool {
        if self.working.is_none() {
            return false;
        }
        self.selection.begin(point)
    }

    /// Extends the active drag to a new pointer position.
    pub fn update_selection(&mut self, point: Point) -> bool {
        self.selection.update(point)
    }

    /// Ends the drag and commits the band, queueing a preview render.
    ///
    /// A full-range band still commits (so the user sees what they
    /// selected) but is not worth rendering: applying it can only fail.
    pub fn commit_selection(&mut self) -> Option<SelectionRange> {
        let range = self.selection.commit()?;
        if let Some(image) = &self.working {
            if !range.is_full() {
                self.coordinator.submit(PreviewRequest {
                    image: Arc::clone(image),
                    range,
                });
            }
        }
        Some(range)
    }

    /// Abandons the selection in whatever phase it is in.
    pub fn cancel_selection(&mut self) {
        self.selection.cancel();
    }

    /// Drains finished preview renders, adopting the newest result.
    ///
    /// Failures are returned as events with the previous preview left in
    /// place, so callers can report them without losing the display.
    pub fn poll_preview(&mut self) -> Vec<PreviewEvent> {
        let events = self.coordinator.poll();
        for event in &events {
            if let PreviewEvent::Ready { image, .. } = event {
                self.preview = Some(Arc::clone(image));
            }
        }
        events
    }

    /// Re-scans the session directory.
    ///
    /// The current entry survives if its file is still listed. If it
    /// vanished, the session has no current entry and the viewer clears.
    pub fn refresh(&mut self) -> Result<(), ViewerError> {
        let session = self.session.as_mut().ok_or(ViewerError::NoImage)?;
        session.refresh(&self.store)?;
        if session.current_entry().is_none() {
            self.clear_image();
        }
        Ok(())
    }

    /// Routes one key chord through the dispatcher.
    ///
    /// Delete is double-press confirmed: the first press arms, a second
    /// inside the confirm window deletes. Any other chord disarms a
    /// pending confirmation, bound or not.
    pub fn handle_key(&mut self, chord: KeyChord) -> Result<ActionOutcome, ViewerError> {
        let action = self.shortcuts.resolve(chord);
        if !matches!(action, Some(ViewerAction::DeleteCurrent)) {
            self.confirm_delete.disarm();
        }
        let Some(action) = action else {
            return Ok(ActionOutcome::Unbound);
        };

        match action {
            ViewerAction::NextImage | ViewerAction::PreviousImage | ViewerAction::DeleteCurrent
                if !self.has_current() =>
            {
                Ok(ActionOutcome::Ignored)
            }
            ViewerAction::RefreshSession if self.session.is_none() => Ok(ActionOutcome::Ignored),
            ViewerAction::SaveAs | ViewerAction::OpenEditor if self.working.is_none() => {
                Ok(ActionOutcome::Ignored)
            }
            ViewerAction::NextImage => {
                self.navigate(1)?;
                Ok(ActionOutcome::Navigated)
            }
            ViewerAction::PreviousImage => {
                self.navigate(-1)?;
                Ok(ActionOutcome::Navigated)
            }
            ViewerAction::DeleteCurrent => match self.confirm_delete.press() {
                DoublePress::Armed => Ok(ActionOutcome::DeleteArmed),
                DoublePress::Confirmed => {
                    self.delete_current()?;
                    Ok(ActionOutcome::Deleted)
                }
            },
            ViewerAction::CommitSelection => {
                if self.commit_selection().is_some() {
                    Ok(ActionOutcome::SelectionCommitted)
                } else {
                    Ok(ActionOutcome::Ignored)
                }
            }
            ViewerAction::CancelSelection => {
                self.cancel_selection();
                Ok(ActionOutcome::SelectionCancelled)
            }
            ViewerAction::ToggleSelectionAxis => {
                self.selection.set_axis(self.selection.axis().toggled());
                Ok(ActionOutcome::AxisToggled)
            }
            ViewerAction::SaveAs => Ok(ActionOutcome::SaveRequested),
            ViewerAction::OpenEditor => Ok(ActionOutcome::EditRequested),
            ViewerAction::RefreshSession => {
                self.refresh()?;
                Ok(ActionOutcome::Refreshed)
            }
        }
    }

    /// The full-resolution image edits apply to.
    pub fn working_image(&self) -> Option<&Arc<RasterImage>> {
        self.working.as_ref()
    }

    /// The downscaled render of the committed band removal, if one has
    /// finished.
    pub fn preview_image(&self) -> Option<&Arc<RasterImage>> {
        self.preview.as_ref()
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn session(&self) -> Option<&DirectorySession> {
        self.session.as_ref()
    }

    pub fn shortcuts(&self) -> &ShortcutDispatcher {
        &self.shortcuts
    }

    /// Mutable access for rebinding shortcuts at runtime.
    pub fn shortcuts_mut(&mut self) -> &mut ShortcutDispatcher {
        &mut self.shortcuts
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Whether the first delete press is waiting for its confirmation.
    pub fn delete_armed(&self) -> bool {
        self.confirm_delete.is_armed()
    }

    /// True when no preview render is running or queued.
    pub fn is_preview_idle(&self) -> bool {
        self.coordinator.is_idle()
    }

    fn has_current(&self) -> bool {
        self.session
            .as_ref()
            .and_then(|session| session.current_index())
            .is_some()
    }

    /// Installs a new working image and resets everything derived from
    /// the old one.
    fn adopt_image(&mut self, image: RasterImage) {
        let image = Arc::new(image);
        self.selection.image_changed();
        self.selection
            .set_display_rect(contain_rect(self.viewport, image.width, image.height));
        self.preview = None;
        self.working = Some(image);
    }

    fn clear_image(&mut self) {
        self.working = None;
        self.preview = None;
        self.selection.image_changed();
    }

    /// Reads and decodes `path` into the working slot. On failure the
    /// last good image stays in place.
    fn load_path(&mut self, path: &Path) -> Result<(), ViewerError> {
        let bytes = self.store.read_bytes(path)?;
        let image = decode_image(&bytes)?;
        self.adopt_image(image);
        Ok(())
    }
}
