//! Default module resolution.
//!
//! Runs inside the plugin host when no plugin claims an import. Handles:
//!
//! - external patterns from [`BuildOptions::external`]
//! - Node.js built-ins (external on [`Platform::Node`])
//! - everything else through `oxc_resolver` on the OS file system
//!
//! A custom [`FileSystem`] only serves relative and absolute imports: the
//! exact path, the path plus each resolve extension, then `index` inside it.

use crate::diagnostics::Message;
use crate::fs::FileSystem;
use crate::options::{BuildOptions, Platform};
use crate::plugin::ResolveKind;
use oxc_resolver::{ResolveOptions, Resolver};
use path_clean::PathClean;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Whether `specifier` names a Node.js built-in module (`fs`, `fs/promises`,
/// `node:path`).
pub fn is_node_builtin(specifier: &str) -> bool {
    if specifier.starts_with("node:") {
        return true;
    }
    let root = specifier.split('/').next().unwrap_or(specifier);
    NODE_BUILTINS.contains(&root)
}

/// External package pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ExternalPattern {
    /// `react` matches `react` and `react/jsx-runtime`
    Exact(String),
    /// `@scope/*`, `*.png`: one `*` wildcard
    Wildcard { prefix: String, suffix: String },
}

impl ExternalPattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.split_once('*') {
            Some((prefix, suffix)) => ExternalPattern::Wildcard {
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
            },
            None => ExternalPattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, specifier: &str) -> bool {
        match self {
            ExternalPattern::Exact(name) => {
                specifier == name
                    || specifier
                        .strip_prefix(name.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            ExternalPattern::Wildcard { prefix, suffix } => {
                specifier.len() >= prefix.len() + suffix.len()
                    && specifier.starts_with(prefix.as_str())
                    && specifier.ends_with(suffix.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolved {
    Path(PathBuf),
    External(String),
}

pub(crate) struct DefaultResolver {
    fs: Arc<dyn FileSystem>,
    /// Present when modules come from the OS file system
    node: Option<Resolver>,
    platform: Platform,
    cwd: PathBuf,
    extensions: Vec<String>,
    externals: Vec<ExternalPattern>,
}

impl DefaultResolver {
    pub fn new(options: &BuildOptions) -> Self {
        let node = options.fs.is_none().then(|| {
            Resolver::new(ResolveOptions {
                condition_names: options
                    .platform
                    .conditions()
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
                main_fields: options
                    .platform
                    .main_fields()
                    .iter()
                    .map(|f| f.to_string())
                    .collect(),
                extensions: options.resolve_extensions.clone(),
                ..Default::default()
            })
        });
        Self {
            fs: options.file_system(),
            node,
            platform: options.platform,
            cwd: options.cwd(),
            extensions: options.resolve_extensions.clone(),
            externals: options
                .external
                .iter()
                .map(|p| ExternalPattern::parse(p))
                .collect(),
        }
    }

    /// Resolve `specifier` imported from `resolve_dir`.
    pub fn resolve(
        &self,
        specifier: &str,
        resolve_dir: Option<&Path>,
        kind: ResolveKind,
    ) -> Result<Resolved, Message> {
        if kind != ResolveKind::EntryPoint && self.externals.iter().any(|p| p.matches(specifier))
        {
            return Ok(Resolved::External(specifier.to_string()));
        }

        let dir = resolve_dir.unwrap_or(self.cwd.as_path());
        let is_path = is_relative(specifier) || Path::new(specifier).is_absolute();

        // Entry points may omit the leading `./`
        if kind == ResolveKind::EntryPoint && !is_path {
            if let Some(path) = self.lookup(&self.cwd, &format!("./{}", specifier)) {
                return Ok(Resolved::Path(path));
            }
        }

        if !is_path && is_node_builtin(specifier) {
            if self.platform == Platform::Node {
                return Ok(Resolved::External(specifier.to_string()));
            }
            return Err(not_found(specifier).with_note(format!(
                "The package \"{}\" wasn't found on the file system but is built into node. \
                 Set the platform to \"node\" to mark it as external.",
                specifier
            )));
        }

        if is_relative(specifier) && resolve_dir.is_none() {
            return Err(not_found(specifier));
        }
        self.lookup(dir, specifier)
            .map(Resolved::Path)
            .ok_or_else(|| not_found(specifier))
    }

    fn lookup(&self, dir: &Path, specifier: &str) -> Option<PathBuf> {
        match &self.node {
            Some(resolver) => match resolver.resolve(dir, specifier) {
                Ok(resolution) => Some(resolution.path().to_path_buf()),
                Err(err) => {
                    tracing::trace!(specifier, dir = %dir.display(), %err, "oxc_resolver miss");
                    None
                }
            },
            None => {
                let path = Path::new(specifier);
                if !is_relative(specifier) && !path.is_absolute() {
                    return None;
                }
                let path = dir.join(path).clean();
                self.find_file(&path)
                    .or_else(|| self.find_file(&path.join("index")))
            }
        }
    }

    /// `path` itself, then `path` with each resolve extension appended.
    fn find_file(&self, path: &Path) -> Option<PathBuf> {
        if self.fs.is_file(path) {
            return Some(path.to_path_buf());
        }
        self.extensions.iter().find_map(|ext| {
            let mut candidate = OsString::from(path.as_os_str());
            candidate.push(ext);
            let candidate = PathBuf::from(candidate);
            self.fs.is_file(&candidate).then_some(candidate)
        })
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

fn not_found(specifier: &str) -> Message {
    Message::new(format!("Could not resolve \"{}\"", specifier))
}
