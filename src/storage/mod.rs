//! Hierarchical file storage used by every persistent component.
//!
//! All paths handed to a [`Storage`] are relative to its root. Two backends
//! are provided:
//!
//! - [`FsStorage`]: a directory on disk; writes replace files atomically
//! - [`MemoryStorage`]: an in-process tree, used by tests
//!
//! Listings are always sorted by name so that every enumeration built on top
//! of a storage (jobs, images, exports) is deterministic.

mod fs;
mod memory;

use std::io;
use std::path::Path;

pub use fs::FsStorage;
pub use memory::MemoryStorage;

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    /// File or directory name (no path components)
    pub name: String,
    /// Whether the entry is a directory
    pub is_dir: bool,
}

impl StorageEntry {
    /// Whether the name starts with a dot.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}

/// Filesystem-like storage backend.
pub trait Storage: Send + Sync {
    /// Create a directory and all missing parents. Existing directories are fine.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// List the direct children of a directory, sorted by name.
    ///
    /// Fails with [`io::ErrorKind::NotFound`] when the directory does not exist.
    fn list(&self, path: &Path) -> io::Result<Vec<StorageEntry>>;

    /// Read a whole file.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace a whole file. A concurrent reader observes either the old or
    /// the new content, never a partial write. The parent directory must exist.
    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    /// Whether a file or directory exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Whether a directory exists at `path`.
    fn is_dir(&self, path: &Path) -> bool;
}
