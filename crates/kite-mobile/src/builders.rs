//! Callback outcomes and their builders.
//!
//! Every constructor returns a fully populated value: diagnostic and watch
//! lists start empty, never unset, so hosts can always ask for a count.

use crate::types::{Loader, Message, SideEffects};
use serde::{Deserialize, Serialize};

/// Result of a resolve callback.
///
/// An outcome with no path, `external == false`, and no errors passes the
/// import on to the next rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveOutcome {
    pub plugin_name: String,
    pub errors: Vec<Message>,
    pub warnings: Vec<Message>,
    pub path: String,
    pub external: bool,
    pub side_effects: SideEffects,
    /// Non-empty routes the module to a virtual provider
    pub namespace: String,
    pub suffix: String,
    pub watch_files: Vec<String>,
    pub watch_dirs: Vec<String>,
}

impl ResolveOutcome {
    /// An outcome that defers to the next rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve to a file path.
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Leave the import out of the bundle and reference it at runtime.
    ///
    /// ```
    /// use kite_mobile::ResolveOutcome;
    ///
    /// let outcome = ResolveOutcome::external("left-pad");
    /// assert!(outcome.external);
    /// assert_eq!(outcome.error_count(), 0);
    /// ```
    pub fn external(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            external: true,
            ..Self::default()
        }
    }

    /// Route the module to a virtual namespace.
    pub fn redirect(path: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn resolved(path: impl Into<String>, external: bool, namespace: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            external,
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn with_error(mut self, message: impl Into<Message>) -> Self {
        self.errors.push(message.into());
        self
    }

    pub fn with_warning(mut self, message: impl Into<Message>) -> Self {
        self.warnings.push(message.into());
        self
    }

    pub fn with_watch_file(mut self, path: impl Into<String>) -> Self {
        self.watch_files.push(path.into());
        self
    }

    pub fn with_watch_dir(mut self, path: impl Into<String>) -> Self {
        self.watch_dirs.push(path.into());
        self
    }

    pub fn with_side_effects(mut self, side_effects: SideEffects) -> Self {
        self.side_effects = side_effects;
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_plugin_name(mut self, name: impl Into<String>) -> Self {
        self.plugin_name = name.into();
        self
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn watch_file_count(&self) -> usize {
        self.watch_files.len()
    }

    pub fn watch_dir_count(&self) -> usize {
        self.watch_dirs.len()
    }
}

/// Result of a load callback. `contents == None` defers to the next rule or
/// the default file-system load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOutcome {
    pub plugin_name: String,
    pub errors: Vec<Message>,
    pub warnings: Vec<Message>,
    pub contents: Option<String>,
    pub resolve_dir: String,
    pub loader: Loader,
    pub watch_files: Vec<String>,
    pub watch_dirs: Vec<String>,
}

impl LoadOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply module source text.
    pub fn contents(contents: impl Into<String>, loader: Loader) -> Self {
        Self {
            contents: Some(contents.into()),
            loader,
            ..Self::default()
        }
    }

    /// Supply source text whose imports resolve against `resolve_dir`.
    pub fn contents_in(
        contents: impl Into<String>,
        loader: Loader,
        resolve_dir: impl Into<String>,
    ) -> Self {
        Self {
            resolve_dir: resolve_dir.into(),
            ..Self::contents(contents, loader)
        }
    }

    pub fn js(contents: impl Into<String>) -> Self {
        Self::contents(contents, Loader::Js)
    }

    pub fn ts(contents: impl Into<String>) -> Self {
        Self::contents(contents, Loader::Ts)
    }

    pub fn css(contents: impl Into<String>) -> Self {
        Self::contents(contents, Loader::Css)
    }

    pub fn json(contents: impl Into<String>) -> Self {
        Self::contents(contents, Loader::Json)
    }

    pub fn text(contents: impl Into<String>) -> Self {
        Self::contents(contents, Loader::Text)
    }

    pub fn with_error(mut self, message: impl Into<Message>) -> Self {
        self.errors.push(message.into());
        self
    }

    pub fn with_warning(mut self, message: impl Into<Message>) -> Self {
        self.warnings.push(message.into());
        self
    }

    pub fn with_watch_file(mut self, path: impl Into<String>) -> Self {
        self.watch_files.push(path.into());
        self
    }

    pub fn with_watch_dir(mut self, path: impl Into<String>) -> Self {
        self.watch_dirs.push(path.into());
        self
    }

    pub fn with_plugin_name(mut self, name: impl Into<String>) -> Self {
        self.plugin_name = name.into();
        self
    }

    pub fn has_contents(&self) -> bool {
        self.contents.is_some()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn watch_file_count(&self) -> usize {
        self.watch_files.len()
    }

    pub fn watch_dir_count(&self) -> usize {
        self.watch_dirs.len()
    }
}

/// Result of a start callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartOutcome {
    pub errors: Vec<Message>,
    pub warnings: Vec<Message>,
}

impl StartOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error(mut self, message: impl Into<Message>) -> Self {
        self.errors.push(message.into());
        self
    }

    pub fn with_warning(mut self, message: impl Into<Message>) -> Self {
        self.warnings.push(message.into());
        self
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

/// Result of an end callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndOutcome {
    pub errors: Vec<Message>,
    pub warnings: Vec<Message>,
}

impl EndOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error(mut self, message: impl Into<Message>) -> Self {
        self.errors.push(message.into());
        self
    }

    pub fn with_warning(mut self, message: impl Into<Message>) -> Self {
        self.warnings.push(message.into());
        self
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

/// What an end callback sees of the finished build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub errors: Vec<Message>,
    pub warnings: Vec<Message>,
}

impl BuildSummary {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
