//! In-memory storage.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{Storage, StorageEntry};

#[derive(Debug, Default)]
struct Tree {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
}

impl Tree {
    fn has_dir(&self, path: &Path) -> bool {
        path.as_os_str().is_empty() || self.dirs.contains(path)
    }
}

/// Storage kept entirely in process memory.
///
/// Mirrors the directory semantics of [`super::FsStorage`]: files can only be
/// written into existing directories, and listing a missing directory fails.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tree: Mutex<Tree>,
}

impl MemoryStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    fn tree(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{:?} not found", path))
}

impl Storage for MemoryStorage {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut tree = self.tree();
        if tree.files.contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{:?} is a file", path),
            ));
        }
        for ancestor in path.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                tree.dirs.insert(ancestor.to_path_buf());
            }
        }
        Ok(())
    }

    fn list(&self, path: &Path) -> io::Result<Vec<StorageEntry>> {
        let tree = self.tree();
        if !tree.has_dir(path) {
            return Err(not_found(path));
        }

        let child_name = |p: &Path| -> Option<String> {
            (p.parent() == Some(path))
                .then(|| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .flatten()
        };

        let mut entries: Vec<StorageEntry> = tree
            .dirs
            .iter()
            .filter_map(|d| child_name(d).map(|name| StorageEntry { name, is_dir: true }))
            .chain(
                tree.files
                    .keys()
                    .filter_map(|f| child_name(f).map(|name| StorageEntry { name, is_dir: false })),
            )
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.tree()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut tree = self.tree();
        let parent = path.parent().unwrap_or(Path::new(""));
        if !tree.has_dir(parent) {
            return Err(not_found(parent));
        }
        if tree.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{:?} is a directory", path),
            ));
        }
        tree.files.insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let tree = self.tree();
        tree.has_dir(path) || tree.files.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.tree().has_dir(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_requires_parent_directory() {
        let storage = MemoryStorage::new();
        let err = storage.write(Path::new("jobs/a/meta.json"), b"{}").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        storage.create_dir_all(Path::new("jobs/a")).unwrap();
        storage.write(Path::new("jobs/a/meta.json"), b"{}").unwrap();
        assert_eq!(storage.read(Path::new("jobs/a/meta.json")).unwrap(), b"{}");
    }

    #[test]
    fn test_list_direct_children_only() {
        let storage = MemoryStorage::new();
        storage.create_dir_all(Path::new("jobs/b/images")).unwrap();
        storage.create_dir_all(Path::new("jobs/a")).unwrap();
        storage.write(Path::new("jobs/readme"), b"x").unwrap();

        let entries = storage.list(Path::new("jobs")).unwrap();
        assert_eq!(
            entries,
            vec![
                StorageEntry { name: "a".into(), is_dir: true },
                StorageEntry { name: "b".into(), is_dir: true },
                StorageEntry { name: "readme".into(), is_dir: false },
            ]
        );
        assert!(storage.is_dir(Path::new("")));
        assert!(storage.exists(Path::new("jobs/readme")));
        assert!(!storage.is_dir(Path::new("jobs/readme")));
    }

    #[test]
    fn test_list_missing_directory() {
        let storage = MemoryStorage::new();
        assert_eq!(
            storage.list(Path::new("nope")).unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }
}
