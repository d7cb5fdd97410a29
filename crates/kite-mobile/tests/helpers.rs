//! Shared test utilities for kite-mobile tests

#![allow(dead_code)]

use kite_engine::{FileSystem, FsResult, MemoryFileSystem};
use kite_mobile::{
    BuildOptions, BuildReport, LoadArgs, LoadCallback, LoadOutcome, ResolveArgs, ResolveCallback,
    ResolveOutcome,
};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Boundary options for a project served from memory at `/app`.
pub fn project_options(files: &[(&str, &str)]) -> BuildOptions {
    let fs = MemoryFileSystem::new();
    for (path, contents) in files {
        fs.add_file(Path::new("/app").join(path), *contents);
    }
    let mut options = BuildOptions::new();
    options.working_dir = "/app".into();
    options.set_file_system(Arc::new(fs));
    options
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

/// Resolve callback that records every event and returns a fixed outcome.
#[derive(Debug, Default)]
pub struct RecordingResolve {
    pub outcome: ResolveOutcome,
    pub seen: Mutex<Vec<ResolveArgs>>,
}

impl RecordingResolve {
    pub fn returning(outcome: ResolveOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().len()
    }
}

impl ResolveCallback for RecordingResolve {
    fn call(&self, args: &ResolveArgs) -> ResolveOutcome {
        self.seen.lock().push(args.clone());
        self.outcome.clone()
    }
}

/// Load callback that records every event and returns a fixed outcome.
#[derive(Debug, Default)]
pub struct RecordingLoad {
    pub outcome: LoadOutcome,
    pub seen: Mutex<Vec<LoadArgs>>,
}

impl RecordingLoad {
    pub fn returning(outcome: LoadOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().len()
    }
}

impl LoadCallback for RecordingLoad {
    fn call(&self, args: &LoadArgs) -> LoadOutcome {
        self.seen.lock().push(args.clone());
        self.outcome.clone()
    }
}

/// JavaScript output of a successful build.
pub fn code(report: &BuildReport) -> &str {
    assert!(
        report.errors.is_empty(),
        "Expected build to succeed, got errors: {:?}",
        report.errors
    );
    &report.code
}
