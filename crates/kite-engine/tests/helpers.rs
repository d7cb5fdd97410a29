//! Shared test utilities for kite-engine tests

#![allow(dead_code)]

use kite_engine::{BuildOptions, BuildResult, FileSystem, FsError, FsResult, MemoryFileSystem};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory project rooted at `/app`.
pub fn memory_project(files: &[(&str, &str)]) -> Arc<MemoryFileSystem> {
    let fs = MemoryFileSystem::new();
    for (path, contents) in files {
        fs.add_file(Path::new("/app").join(path), *contents);
    }
    Arc::new(fs)
}

/// BuildOptions for `entry` inside a [`memory_project`].
pub fn project_options(entry: &str, fs: Arc<dyn FileSystem>) -> BuildOptions {
    BuildOptions::new(entry).working_dir("/app").fs(fs)
}

/// File system wrapper that counts reads.
#[derive(Debug, Default)]
pub struct CountingFileSystem {
    pub inner: MemoryFileSystem,
    pub reads: AtomicUsize,
}

impl CountingFileSystem {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl FileSystem for CountingFileSystem {
    fn read_file(&self, path: &Path) -> FsResult<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_file(path)
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> FsResult<()> {
        self.inner.write_file(path, content)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.inner.is_file(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }
}

/// JavaScript output of a successful build.
pub fn js(result: &BuildResult) -> String {
    assert!(
        result.errors.is_empty(),
        "Expected build to succeed, got errors: {:?}",
        result.errors
    );
    result.js_text().expect("Should have a JavaScript output")
}

/// File system that serves reads and refuses every write.
#[derive(Debug, Default)]
pub struct ReadOnlyFileSystem {
    pub inner: MemoryFileSystem,
}

impl FileSystem for ReadOnlyFileSystem {
    fn read_file(&self, path: &Path) -> FsResult<Vec<u8>> {
        self.inner.read_file(path)
    }

    fn write_file(&self, path: &Path, _content: &[u8]) -> FsResult<()> {
        Err(FsError::Io(format!("{} is read-only", path.display())))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.inner.is_file(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }
}
