use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Access to the directory photo files are kept in.
///
/// Every path passed in is relative to the storage root and starts with one of the storage directories
/// (`raw/`, `big/`, `thumb/`, `small/`, `medium/`)
pub trait PhotoStorage {
    fn exists(&self, path: &str) -> bool;

    fn delete(&self, path: &str) -> io::Result<()>;

    /// resolves the path to where it lives on disk. Used for log messages
    fn absolute_path(&self, path: &str) -> PathBuf;

    /// writes the file, creating its directory if needed
    fn write(&self, path: &str, contents: &[u8]) -> io::Result<()>;
}

/// [`PhotoStorage`] backed by a directory on the local disk
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// storage rooted at the configured photo directory
    pub fn from_config() -> Self {
        Self::new(super::photo_dir())
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(Path::new(path))
    }
}

impl PhotoStorage for DiskStorage {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn delete(&self, path: &str) -> io::Result<()> {
        fs::remove_file(self.resolve(path))
    }

    fn absolute_path(&self, path: &str) -> PathBuf {
        let resolved = self.resolve(path);
        if resolved.is_absolute() {
            return resolved;
        }
        match std::env::current_dir() {
            Ok(dir) => dir.join(resolved),
            Err(_) => resolved,
        }
    }

    fn write(&self, path: &str, contents: &[u8]) -> io::Result<()> {
        let resolved = self.resolve(path);
        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(resolved, contents)
    }
}
