use crate::Error;
use crate::fs::{FileSystem, OsFileSystem};
use crate::loader::Loader;
use crate::plugin::Plugin;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Output module format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// `iife` when bundling, `esm` otherwise
    #[default]
    Default,
    Iife,
    Cjs,
    Esm,
}

/// Target runtime platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Browser,
    Node,
    Neutral,
}

impl Platform {
    /// `package.json` fields consulted for a bare import, in priority order.
    pub fn main_fields(self) -> &'static [&'static str] {
        match self {
            Platform::Browser => &["browser", "module", "main"],
            Platform::Node => &["main", "module"],
            Platform::Neutral => &["module", "main"],
        }
    }

    /// `package.json` `exports` conditions, in priority order.
    pub fn conditions(self) -> &'static [&'static str] {
        match self {
            Platform::Browser => &["browser", "import", "module", "default"],
            Platform::Node => &["node", "import", "require", "default"],
            Platform::Neutral => &["import", "module", "default"],
        }
    }
}

/// Language target. Accepted for compatibility; output syntax is whatever
/// rolldown emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    EsNext,
    Es2022,
    Es2020,
    Es2019,
    Es2018,
    Es2017,
    Es2016,
    Es2015,
    Es5,
}

/// Source text passed directly instead of an entry file.
#[derive(Debug, Clone, Default)]
pub struct StdinOptions {
    pub contents: String,
    /// Directory imports inside the stdin module resolve against
    pub resolve_dir: Option<PathBuf>,
    /// Display name used in diagnostics (default: `<stdin>`)
    pub sourcefile: Option<String>,
    pub loader: Loader,
}

impl StdinOptions {
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
            ..Default::default()
        }
    }
}

/// Configuration for a single build pass.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Entry point files, resolved relative to `working_dir`.
    pub entry_points: Vec<String>,

    /// Inline entry module. Built before `entry_points` when present.
    pub stdin: Option<StdinOptions>,

    /// Follow imports and inline dependencies (default: true).
    ///
    /// When `false` each entry is loaded and emitted on its own and its
    /// imports are left untouched.
    pub bundle: bool,

    /// Write output files through the file system (default: false).
    pub write: bool,

    pub outfile: Option<PathBuf>,
    pub outdir: Option<PathBuf>,

    pub platform: Platform,
    pub format: Format,
    pub target: Target,

    pub minify_whitespace: bool,
    pub minify_identifiers: bool,
    pub minify_syntax: bool,

    /// Global variable the IIFE result is assigned to.
    pub global_name: Option<String>,

    /// Identifier replacements applied to every script module.
    pub define: IndexMap<String, String>,

    /// Import paths treated as external (exact, `prefix/*`, or `*suffix`).
    pub external: Vec<String>,

    /// Extension (with dot) to loader overrides.
    pub loaders: FxHashMap<String, Loader>,

    /// Extensions probed for extensionless imports, in order.
    pub resolve_extensions: Vec<String>,

    pub banner: Option<String>,
    pub footer: Option<String>,

    /// Maximum diagnostics emitted through tracing (0 = unlimited).
    pub log_limit: usize,

    /// Plugins, consulted in order.
    pub plugins: Vec<Plugin>,

    /// Working directory for entry point resolution (default: current directory).
    pub working_dir: Option<PathBuf>,

    /// File system used for resolution, loading, and writing (default: OS).
    pub fs: Option<Arc<dyn FileSystem>>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            entry_points: Vec::new(),
            stdin: None,
            bundle: true,
            write: false,
            outfile: None,
            outdir: None,
            platform: Platform::Browser,
            format: Format::Default,
            target: Target::EsNext,
            minify_whitespace: false,
            minify_identifiers: false,
            minify_syntax: false,
            global_name: None,
            define: IndexMap::new(),
            external: Vec::new(),
            loaders: FxHashMap::default(),
            resolve_extensions: default_resolve_extensions(),
            banner: None,
            footer: None,
            log_limit: 10,
            plugins: Vec::new(),
            working_dir: None,
            fs: None,
        }
    }
}

fn default_resolve_extensions() -> Vec<String> {
    [".tsx", ".ts", ".jsx", ".js", ".mjs", ".cjs", ".css", ".json"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl BuildOptions {
    /// Create options for a single entry file.
    ///
    /// ```
    /// use kite_engine::{BuildOptions, Format};
    ///
    /// let options = BuildOptions::new("./src/index.js").format(Format::Esm);
    /// assert_eq!(options.entry_points, vec!["./src/index.js".to_string()]);
    /// ```
    pub fn new(entry: impl Into<String>) -> Self {
        Self {
            entry_points: vec![entry.into()],
            ..Default::default()
        }
    }

    /// Create options that build inline source text.
    pub fn stdin(contents: impl Into<String>) -> Self {
        Self {
            stdin: Some(StdinOptions::new(contents)),
            ..Default::default()
        }
    }

    pub fn entry(mut self, entry: impl Into<String>) -> Self {
        self.entry_points.push(entry.into());
        self
    }

    pub fn bundle(mut self, bundle: bool) -> Self {
        self.bundle = bundle;
        self
    }

    pub fn write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    pub fn outfile(mut self, path: impl Into<PathBuf>) -> Self {
        self.outfile = Some(path.into());
        self
    }

    pub fn outdir(mut self, path: impl Into<PathBuf>) -> Self {
        self.outdir = Some(path.into());
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// Enable all minification flags.
    pub fn minify(mut self, enabled: bool) -> Self {
        self.minify_whitespace = enabled;
        self.minify_identifiers = enabled;
        self.minify_syntax = enabled;
        self
    }

    pub fn global_name(mut self, name: impl Into<String>) -> Self {
        self.global_name = Some(name.into());
        self
    }

    pub fn define(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.define.insert(key.into(), value.into());
        self
    }

    pub fn external<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.external.extend(packages.into_iter().map(Into::into));
        self
    }

    pub fn loader(mut self, extension: impl Into<String>, loader: Loader) -> Self {
        self.loaders.insert(extension.into(), loader);
        self
    }

    pub fn banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn log_limit(mut self, limit: usize) -> Self {
        self.log_limit = limit;
        self
    }

    pub fn plugin(mut self, plugin: Plugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    /// The effective output format: `Default` becomes IIFE when bundling and
    /// ESM otherwise.
    pub fn effective_format(&self) -> Format {
        match (self.format, self.bundle) {
            (Format::Default, true) => Format::Iife,
            (Format::Default, false) => Format::Esm,
            (format, _) => format,
        }
    }

    /// Check option combinations that cannot produce a build.
    ///
    /// ```
    /// use kite_engine::{BuildOptions, Error};
    ///
    /// let options = BuildOptions::new("./a.js").entry("./b.js");
    /// assert!(matches!(options.validate(), Err(Error::InvalidConfig(_))));
    /// assert!(options.outdir("dist").validate().is_ok());
    /// ```
    pub fn validate(&self) -> crate::Result<()> {
        let inputs = self.entry_points.len() + usize::from(self.stdin.is_some());
        if inputs > 1 && self.outdir.is_none() {
            return Err(Error::InvalidConfig(
                "Must use \"outdir\" when there are multiple input files".to_string(),
            ));
        }
        if self.outfile.is_some() && self.outdir.is_some() {
            return Err(Error::InvalidConfig(
                "Cannot use both \"outfile\" and \"outdir\"".to_string(),
            ));
        }
        if let Some(name) = &self.global_name {
            let valid = name.split('.').all(|part| {
                let mut chars = part.chars();
                chars
                    .next()
                    .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
                    && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
            });
            if !valid {
                return Err(Error::InvalidConfig(format!(
                    "Invalid global name \"{}\"",
                    name
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn file_system(&self) -> Arc<dyn FileSystem> {
        self.fs.clone().unwrap_or_else(|| Arc::new(OsFileSystem))
    }

    pub(crate) fn cwd(&self) -> PathBuf {
        self.working_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("/"))
    }

    /// Loader for a resolved path, honoring extension overrides.
    pub(crate) fn loader_for(&self, path: &str) -> Loader {
        let clean = path.split(['?', '#']).next().unwrap_or(path);
        std::path::Path::new(clean)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.loaders.get(&format!(".{}", ext)).copied())
            .unwrap_or_else(|| Loader::from_path(path))
    }
}
