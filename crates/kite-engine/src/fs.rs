//! File system abstraction for the engine.
//!
//! The engine never touches `std::fs` directly. All reads and writes go
//! through a [`FileSystem`], so hosts can swap in [`MemoryFileSystem`] (or
//! their own implementation) to build without a real disk.

use parking_lot::RwLock;
use path_clean::PathClean;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

/// Result type for file system operations
pub type FsResult<T> = Result<T, FsError>;

#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Synchronous file access used by the resolver, loaders, and output writer.
pub trait FileSystem: Send + Sync + std::fmt::Debug {
    fn read_file(&self, path: &Path) -> FsResult<Vec<u8>>;

    fn write_file(&self, path: &Path, content: &[u8]) -> FsResult<()>;

    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> FsResult<String> {
        let bytes = self.read_file(path)?;
        String::from_utf8(bytes)
            .map_err(|_| FsError::Io(format!("{} contains invalid UTF-8", path.display())))
    }
}

/// File system backed by the host operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read_file(&self, path: &Path) -> FsResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FsError::NotFound(path.to_path_buf())
            } else {
                FsError::Io(format!("Failed to read {}: {}", path.display(), e))
            }
        })
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> FsResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FsError::Io(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        std::fs::write(path, content)
            .map_err(|e| FsError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// In-memory file system.
///
/// Paths are cleaned before storage so `/app/./src/../a.js` and `/app/a.js`
/// refer to the same entry. Directories exist implicitly as ancestors of
/// stored files.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<FxHashMap<PathBuf, Vec<u8>>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a file.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.files
            .write()
            .insert(path.as_ref().clean(), content.into());
    }

    /// Builder-style variant of [`add_file`](Self::add_file).
    pub fn with_file(self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Self {
        self.add_file(path, content);
        self
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_file(&self, path: &Path) -> FsResult<Vec<u8>> {
        let path = path.clean();
        self.files
            .read()
            .get(&path)
            .cloned()
            .ok_or(FsError::NotFound(path))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> FsResult<()> {
        self.files.write().insert(path.clean(), content.to_vec());
        Ok(())
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.read().contains_key(&path.clean())
    }

    fn is_dir(&self, path: &Path) -> bool {
        let dir = path.clean();
        self.files
            .read()
            .keys()
            .any(|file| file != &dir && file.starts_with(&dir))
    }
}
