//! Callback interfaces.
//!
//! The host cannot hand closures across the boundary, so each hook is a
//! trait with exactly one synchronous method. Host objects implement the
//! trait; the common fixed behaviors are provided here.

use crate::builders::{BuildSummary, EndOutcome, LoadOutcome, ResolveOutcome, StartOutcome};
use crate::types::{Loader, ResolveKind};
use serde::{Deserialize, Serialize};

/// A resolve event: the engine needs a location for an import path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveArgs {
    /// The import path as written
    pub path: String,
    /// Path of the importing module (empty for entry points)
    pub importer: String,
    /// Namespace of the importing module
    pub namespace: String,
    pub resolve_dir: String,
    pub kind: ResolveKind,
}

/// A load event: the engine needs the contents of a resolved module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadArgs {
    pub path: String,
    pub namespace: String,
    pub suffix: String,
}

pub trait ResolveCallback: Send + Sync {
    fn call(&self, args: &ResolveArgs) -> ResolveOutcome;
}

pub trait LoadCallback: Send + Sync {
    fn call(&self, args: &LoadArgs) -> LoadOutcome;
}

pub trait StartCallback: Send + Sync {
    fn call(&self) -> StartOutcome;
}

pub trait EndCallback: Send + Sync {
    fn call(&self, summary: &BuildSummary) -> EndOutcome;
}

/// Resolve every matching import to the same place.
///
/// `external` wins over `namespace`; an empty `path` keeps the import path
/// as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticResolve {
    pub path: String,
    pub namespace: String,
    pub external: bool,
}

impl StaticResolve {
    pub fn external() -> Self {
        Self {
            external: true,
            ..Self::default()
        }
    }

    pub fn redirect(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

impl ResolveCallback for StaticResolve {
    fn call(&self, args: &ResolveArgs) -> ResolveOutcome {
        let path = if self.path.is_empty() {
            args.path.clone()
        } else {
            self.path.clone()
        };
        if self.external {
            ResolveOutcome::external(path)
        } else if !self.namespace.is_empty() {
            ResolveOutcome::redirect(path, self.namespace.clone())
        } else {
            ResolveOutcome::path(path)
        }
    }
}

/// Serve the same contents for every matching module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticLoad {
    pub contents: String,
    pub loader: Loader,
}

impl StaticLoad {
    pub fn new(contents: impl Into<String>, loader: Loader) -> Self {
        Self {
            contents: contents.into(),
            loader,
        }
    }
}

impl LoadCallback for StaticLoad {
    fn call(&self, _args: &LoadArgs) -> LoadOutcome {
        LoadOutcome::contents(self.contents.clone(), self.loader)
    }
}

/// Log a line when the build starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogStart {
    pub message: String,
}

impl LogStart {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl StartCallback for LogStart {
    fn call(&self) -> StartOutcome {
        tracing::info!("{}", self.message);
        StartOutcome::new()
    }
}
