//! Directory-backed browsing session.
//!
//! Opening an image implicitly opens its parent directory: every sibling
//! image becomes part of the session, ordered case-insensitively by path.
//! Navigation is circular in both directions. The session only tracks the
//! listing; deleting files on disk is the caller's job, performed *before*
//! the entry is dropped from the list.

use std::path::{Path, PathBuf};

use crate::fs::{FileStore, FileSystemError};

/// One image in the session listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    path: PathBuf,
}

impl ImageEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Full path of the image file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name for display, if the path has a UTF-8 one.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }
}

/// An ordered listing of the images in one directory plus a cursor.
#[derive(Debug, Clone)]
pub struct DirectorySession {
    directory: PathBuf,
    entries: Vec<ImageEntry>,
    current: Option<usize>,
}

impl DirectorySession {
    /// Build a session from an already-sorted listing.
    ///
    /// `current_path` selects the cursor; if it is absent from `paths` the
    /// session starts with no current entry.
    pub fn new(directory: PathBuf, paths: Vec<PathBuf>, current_path: Option<&Path>) -> Self {
        let entries: Vec<ImageEntry> = paths.into_iter().map(ImageEntry::new).collect();
        let current =
            current_path.and_then(|path| entries.iter().position(|e| e.path() == path));
        Self {
            directory,
            entries,
            current,
        }
    }

    /// Open a session for the directory containing `reference`, with
    /// `reference` as the current entry.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be scanned.
    pub fn open(store: &impl FileStore, reference: &Path) -> Result<Self, FileSystemError> {
        let directory = parent_directory(reference);
        let paths = store.list_images(&directory)?;
        log::debug!(
            "opened session in {} with {} images",
            directory.display(),
            paths.len()
        );
        Ok(Self::new(directory, paths, Some(reference)))
    }

    /// Re-scan the session directory, keeping the current entry if its
    /// path is still listed; if the file vanished there is no current
    /// entry afterwards.
    ///
    /// On scan failure the session is left untouched.
    pub fn refresh(&mut self, store: &impl FileStore) -> Result<(), FileSystemError> {
        let paths = store.list_images(&self.directory)?;
        let previous_path = self.current_entry().map(|e| e.path().to_path_buf());

        self.entries = paths.into_iter().map(ImageEntry::new).collect();
        self.current =
            previous_path.and_then(|path| self.entries.iter().position(|e| e.path() == path));
        log::debug!("session refreshed: {} images", self.entries.len());
        Ok(())
    }

    /// Move the cursor by `step` entries, wrapping at both ends.
    ///
    /// Returns the new current entry, or `None` if the session is empty.
    pub fn navigate(&mut self, step: isize) -> Option<&ImageEntry> {
        let len = self.entries.len();
        let index = self.current?;
        if len == 0 {
            return None;
        }
        let next = (index as isize + step).rem_euclid(len as isize) as usize;
        self.current = Some(next);
        self.entries.get(next)
    }

    /// Drop the entry with the given path from the listing.
    ///
    /// Returns `false` if the path is not in the session. The cursor is
    /// adjusted so that:
    /// - removing an entry before the current one keeps the same image
    ///   current (its index shifts down by one)
    /// - removing the current entry moves to the entry now at the same
    ///   index, or the new last entry if the removed one was last
    /// - removing the only entry leaves no current
    pub fn remove(&mut self, path: &Path) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.path() == path) else {
            return false;
        };
        self.entries.remove(index);

        self.current = match self.current {
            None => None,
            Some(_) if self.entries.is_empty() => None,
            Some(current) if index < current => Some(current - 1),
            Some(current) if index == current => Some(current.min(self.entries.len() - 1)),
            Some(current) => Some(current),
        };
        true
    }

    /// Drop the current entry from the listing and return it.
    pub fn remove_current(&mut self) -> Option<ImageEntry> {
        let entry = self.current_entry()?.clone();
        self.remove(entry.path());
        Some(entry)
    }

    /// The entry the cursor points at.
    pub fn current_entry(&self) -> Option<&ImageEntry> {
        self.current.and_then(|i| self.entries.get(i))
    }

    /// Zero-based cursor position.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// The directory this session lists.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// All entries in presentation order.
    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parent directory of a file path, defaulting to `.` for bare names.
fn parent_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{is_image_path, sort_paths, FileStore};
    use std::cell::{Cell, RefCell};

    /// In-memory file listing standing in for a directory on disk.
    struct FakeStore {
        files: RefCell<Vec<PathBuf>>,
        fail_scan: Cell<bool>,
    }

    impl FakeStore {
        fn new(files: &[&str]) -> Self {
            Self {
                files: RefCell::new(files.iter().map(PathBuf::from).collect()),
                fail_scan: Cell::new(false),
            }
        }

        fn remove_file(&self, path: &str) {
            self.files.borrow_mut().retain(|p| p != Path::new(path));
        }

        fn add_file(&self, path: &str) {
            self.files.borrow_mut().push(PathBuf::from(path));
        }
    }

    impl FileStore for FakeStore {
        fn read_bytes(&self, _path: &Path) -> Result<Vec<u8>, FileSystemError> {
            Ok(Vec::new())
        }

        fn write_bytes(&self, _path: &Path, _bytes: &[u8]) -> Result<(), FileSystemError> {
            Ok(())
        }

        fn delete(&self, path: &Path) -> Result<(), FileSystemError> {
            self.files.borrow_mut().retain(|p| p != path);
            Ok(())
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.borrow().iter().any(|p| p == path)
        }

        fn list_images(&self, dir: &Path) -> Result<Vec<PathBuf>, FileSystemError> {
            if self.fail_scan.get() {
                return Err(FileSystemError::Scan {
                    path: dir.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                });
            }
            let mut paths: Vec<PathBuf> = self
                .files
                .borrow()
                .iter()
                .filter(|p| p.parent() == Some(dir) && is_image_path(p))
                .cloned()
                .collect();
            sort_paths(&mut paths);
            Ok(paths)
        }
    }

    /// Session over five images with the cursor at `current`.
    fn five_entry_session(current: usize) -> DirectorySession {
        let paths: Vec<PathBuf> = (0..5).map(|i| PathBuf::from(format!("/pics/{i}.jpg"))).collect();
        let current_path = paths[current].clone();
        DirectorySession::new(PathBuf::from("/pics"), paths, Some(&current_path))
    }

    #[test]
    fn test_open_positions_cursor() {
        let store = FakeStore::new(&["/pics/a.jpg", "/pics/b.jpg", "/pics/c.jpg"]);
        let session = DirectorySession::open(&store, Path::new("/pics/b.jpg")).unwrap();

        assert_eq!(session.len(), 3);
        assert_eq!(session.current_index(), Some(1));
        assert_eq!(session.directory(), Path::new("/pics"));
    }

    #[test]
    fn test_open_skips_non_images_and_other_dirs() {
        let store = FakeStore::new(&[
            "/pics/a.jpg",
            "/pics/notes.txt",
            "/pics/sub/d.jpg",
            "/elsewhere/x.jpg",
        ]);
        let session = DirectorySession::open(&store, Path::new("/pics/a.jpg")).unwrap();

        assert_eq!(session.len(), 1);
        assert_eq!(session.current_index(), Some(0));
    }

    #[test]
    fn test_open_reference_missing_from_listing() {
        let store = FakeStore::new(&["/pics/a.jpg"]);
        let session = DirectorySession::open(&store, Path::new("/pics/gone.jpg")).unwrap();

        assert_eq!(session.len(), 1);
        assert_eq!(session.current_index(), None);
    }

    #[test]
    fn test_navigate_forward() {
        let mut session = five_entry_session(2);
        let entry = session.navigate(1).unwrap();

        assert_eq!(entry.path(), Path::new("/pics/3.jpg"));
        assert_eq!(session.current_index(), Some(3));
    }

    #[test]
    fn test_navigate_wraps_forward() {
        let mut session = five_entry_session(4);
        session.navigate(1);
        assert_eq!(session.current_index(), Some(0));
    }

    #[test]
    fn test_navigate_backward_wraps() {
        let mut session = five_entry_session(0);

        session.navigate(-1);
        assert_eq!(session.current_index(), Some(4));

        session.navigate(-1);
        assert_eq!(session.current_index(), Some(3));
    }

    #[test]
    fn test_navigate_single_entry_stays_put() {
        let paths = vec![PathBuf::from("/pics/only.jpg")];
        let mut session =
            DirectorySession::new(PathBuf::from("/pics"), paths, Some(Path::new("/pics/only.jpg")));

        session.navigate(1);
        assert_eq!(session.current_index(), Some(0));
        session.navigate(-1);
        assert_eq!(session.current_index(), Some(0));
    }

    #[test]
    fn test_navigate_without_cursor() {
        let mut session = DirectorySession::new(
            PathBuf::from("/pics"),
            vec![PathBuf::from("/pics/a.jpg")],
            None,
        );
        assert!(session.navigate(1).is_none());
    }

    #[test]
    fn test_remove_last_entry_steps_back() {
        let mut session = five_entry_session(4);
        assert!(session.remove(Path::new("/pics/4.jpg")));

        assert_eq!(session.len(), 4);
        assert_eq!(session.current_index(), Some(3));
    }

    #[test]
    fn test_remove_middle_entry_keeps_index() {
        let mut session = five_entry_session(2);
        assert!(session.remove(Path::new("/pics/2.jpg")));

        // The entry that was at index 3 is now current at index 2
        assert_eq!(session.current_index(), Some(2));
        assert_eq!(
            session.current_entry().unwrap().path(),
            Path::new("/pics/3.jpg")
        );
    }

    #[test]
    fn test_remove_sole_entry_clears_cursor() {
        let paths = vec![PathBuf::from("/pics/only.jpg")];
        let mut session =
            DirectorySession::new(PathBuf::from("/pics"), paths, Some(Path::new("/pics/only.jpg")));

        assert!(session.remove(Path::new("/pics/only.jpg")));
        assert!(session.is_empty());
        assert_eq!(session.current_index(), None);
        assert!(session.current_entry().is_none());
    }

    #[test]
    fn test_remove_before_current_preserves_item() {
        let mut session = five_entry_session(3);
        session.remove(Path::new("/pics/1.jpg"));

        assert_eq!(session.current_index(), Some(2));
        assert_eq!(
            session.current_entry().unwrap().path(),
            Path::new("/pics/3.jpg")
        );
    }

    #[test]
    fn test_remove_after_current_preserves_item() {
        let mut session = five_entry_session(1);
        session.remove(Path::new("/pics/4.jpg"));

        assert_eq!(session.current_index(), Some(1));
        assert_eq!(
            session.current_entry().unwrap().path(),
            Path::new("/pics/1.jpg")
        );
    }

    #[test]
    fn test_remove_unknown_path() {
        let mut session = five_entry_session(2);
        assert!(!session.remove(Path::new("/pics/unknown.jpg")));
        assert_eq!(session.len(), 5);
        assert_eq!(session.current_index(), Some(2));
    }

    #[test]
    fn test_remove_current_returns_entry() {
        let mut session = five_entry_session(2);
        let removed = session.remove_current().unwrap();

        assert_eq!(removed.path(), Path::new("/pics/2.jpg"));
        assert_eq!(session.len(), 4);
    }

    #[test]
    fn test_refresh_picks_up_new_files() {
        let store = FakeStore::new(&["/pics/a.jpg", "/pics/c.jpg"]);
        let mut session = DirectorySession::open(&store, Path::new("/pics/c.jpg")).unwrap();

        store.add_file("/pics/b.jpg");
        session.refresh(&store).unwrap();

        assert_eq!(session.len(), 3);
        // c.jpg is still current even though its index moved
        assert_eq!(session.current_index(), Some(2));
        assert_eq!(
            session.current_entry().unwrap().path(),
            Path::new("/pics/c.jpg")
        );
    }

    #[test]
    fn test_refresh_clears_cursor_when_current_vanished() {
        let store = FakeStore::new(&["/pics/a.jpg", "/pics/b.jpg"]);
        let mut session = DirectorySession::open(&store, Path::new("/pics/b.jpg")).unwrap();

        store.remove_file("/pics/b.jpg");
        session.refresh(&store).unwrap();

        // The other entries stay listed but nothing is current anymore.
        assert_eq!(session.len(), 1);
        assert_eq!(session.current_index(), None);
        assert!(session.current_entry().is_none());
    }

    #[test]
    fn test_refresh_empty_listing_clears_cursor() {
        let store = FakeStore::new(&["/pics/a.jpg"]);
        let mut session = DirectorySession::open(&store, Path::new("/pics/a.jpg")).unwrap();

        store.remove_file("/pics/a.jpg");
        session.refresh(&store).unwrap();

        assert!(session.is_empty());
        assert_eq!(session.current_index(), None);
    }

    #[test]
    fn test_refresh_failure_leaves_session_untouched() {
        let store = FakeStore::new(&["/pics/a.jpg", "/pics/b.jpg"]);
        let mut session = DirectorySession::open(&store, Path::new("/pics/b.jpg")).unwrap();

        store.fail_scan.set(true);
        assert!(session.refresh(&store).is_err());

        assert_eq!(session.len(), 2);
        assert_eq!(session.current_index(), Some(1));
    }

    #[test]
    fn test_entry_file_name() {
        let entry = ImageEntry::new("/pics/photo.jpg");
        assert_eq!(entry.file_name(), Some("photo.jpg"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
