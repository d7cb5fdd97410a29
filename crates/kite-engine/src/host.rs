//! Rolldown plugin that drives the closure-based plugin protocol.
//!
//! Rolldown owns parsing, linking, tree shaking, and printing. The host sits
//! in front of it and answers every `resolve_id` and `load` hook:
//!
//! - `resolve_id`: `on_resolve` subscriptions, then [`DefaultResolver`]
//! - `load`: `on_load` subscriptions, then the build's [`FileSystem`]
//!
//! Modules outside the `file` namespace get `\0<namespace>:<path>` ids so
//! rolldown treats them as virtual. Diagnostics are collected in the host's
//! [`Log`] instead of failing the hook, so one build reports every problem;
//! the driver drops the bundle when the log has errors.

use crate::diagnostics::{Log, Message, location_for};
use crate::fs::{FileSystem, FsError};
use crate::loader::{self, Content, Loader};
use crate::options::BuildOptions;
use crate::plugin::{
    FILE_NAMESPACE, OnLoadArgs, OnLoadResult, OnResolveArgs, OnResolveResult, ResolveKind,
    Subscriptions,
};
use crate::resolver::{DefaultResolver, Resolved};
use crate::transform::apply_define;
use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;
use rolldown_common::{ImportKind, ModuleType, ResolvedExternal};
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};
use rustc_hash::FxHashMap;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Module id of the inline stdin entry.
pub(crate) const STDIN_ID: &str = "\0kite:stdin";

/// Prefix of placeholder ids handed to rolldown after a failed resolution.
const UNRESOLVED_PREFIX: &str = "\0kite:unresolved:";

/// A module the host resolved, keyed by its rolldown id.
#[derive(Debug, Clone, Default)]
struct ModuleRecord {
    path: String,
    namespace: String,
    suffix: String,
    resolve_dir: Option<PathBuf>,
    /// Script source after loaders and `define`, for diagnostics
    source: String,
}

/// Everything the host gathers while rolldown runs.
#[derive(Debug, Default)]
pub(crate) struct HostState {
    pub log: Log,
    pub watch_files: IndexSet<String>,
    pub watch_dirs: IndexSet<String>,
    /// Stylesheets in load order
    pub css: IndexMap<String, String>,
    modules: FxHashMap<String, ModuleRecord>,
}

impl HostState {
    fn watch(&mut self, files: Vec<String>, dirs: Vec<String>) {
        self.watch_files.extend(files);
        self.watch_dirs.extend(dirs);
    }
}

enum Resolution {
    Module {
        path: String,
        namespace: String,
        suffix: String,
    },
    External(String),
}

/// Module contents returned by a plugin or read from disk.
struct Loaded {
    bytes: Vec<u8>,
    loader: Loader,
    resolve_dir: Option<PathBuf>,
}

pub(crate) struct PluginHost {
    subscriptions: Arc<Subscriptions>,
    resolver: DefaultResolver,
    fs: Arc<dyn FileSystem>,
    options: BuildOptions,
    cwd: PathBuf,
    state: Mutex<HostState>,
}

impl std::fmt::Debug for PluginHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginHost")
            .field("cwd", &self.cwd)
            .field("subscriptions", &self.subscriptions.summary())
            .finish_non_exhaustive()
    }
}

fn plugin_error(plugin_name: &str, err: anyhow::Error) -> Message {
    Message::new(format!("{:#}", err)).from_plugin(plugin_name)
}

fn module_id(path: &str, namespace: &str, suffix: &str) -> String {
    if namespace == FILE_NAMESPACE {
        format!("{}{}", path, suffix)
    } else {
        format!("\0{}:{}{}", namespace, path, suffix)
    }
}

fn default_resolve_dir(path: &str, namespace: &str) -> Option<PathBuf> {
    if namespace != FILE_NAMESPACE {
        return None;
    }
    Path::new(path).parent().map(Path::to_path_buf)
}

fn resolve_kind(kind: ImportKind) -> ResolveKind {
    match kind {
        ImportKind::Import => ResolveKind::JsImportStatement,
        ImportKind::DynamicImport => ResolveKind::JsDynamicImport,
        ImportKind::Require => ResolveKind::JsRequireCall,
        ImportKind::AtImport => ResolveKind::CssImportRule,
        ImportKind::UrlImport => ResolveKind::CssUrlToken,
        _ => ResolveKind::JsImportStatement,
    }
}

fn internal(id: String) -> HookResolveIdOutput {
    HookResolveIdOutput {
        id: id.into(),
        external: Some(ResolvedExternal::Bool(false)),
        ..Default::default()
    }
}

fn external(specifier: String) -> HookResolveIdOutput {
    HookResolveIdOutput {
        id: specifier.into(),
        external: Some(ResolvedExternal::Bool(true)),
        ..Default::default()
    }
}

fn script(code: String, module_type: ModuleType) -> HookLoadOutput {
    HookLoadOutput {
        code: code.into(),
        module_type: Some(module_type),
        ..Default::default()
    }
}

impl PluginHost {
    pub fn new(subscriptions: Arc<Subscriptions>, options: &BuildOptions) -> Self {
        let cwd = options.cwd();
        let mut state = HostState::default();
        if let Some(stdin) = &options.stdin {
            state.modules.insert(
                STDIN_ID.to_string(),
                ModuleRecord {
                    path: stdin
                        .sourcefile
                        .clone()
                        .unwrap_or_else(|| "<stdin>".to_string()),
                    namespace: FILE_NAMESPACE.to_string(),
                    resolve_dir: Some(stdin.resolve_dir.clone().unwrap_or_else(|| cwd.clone())),
                    ..Default::default()
                },
            );
        }
        Self {
            subscriptions,
            resolver: DefaultResolver::new(options),
            fs: options.file_system(),
            options: options.clone(),
            cwd,
            state: Mutex::new(state),
        }
    }

    /// Take the diagnostics, watch lists, and stylesheets gathered so far.
    pub fn take_state(&self) -> HostState {
        std::mem::take(&mut *self.state.lock())
    }

    /// Record an error raised outside of rolldown's hooks.
    pub fn error(&self, message: Message) {
        self.state.lock().log.error(message);
    }

    pub fn has_errors(&self) -> bool {
        self.state.lock().log.has_errors()
    }

    pub fn run_on_start(&self) {
        let mut state = self.state.lock();
        for sub in &self.subscriptions.start {
            tracing::debug!(plugin = %sub.plugin_name, "onStart");
            match (sub.callback)() {
                Ok(result) => {
                    state
                        .log
                        .extend_from_plugin(&sub.plugin_name, result.errors, result.warnings)
                }
                Err(err) => state.log.error(plugin_error(&sub.plugin_name, err)),
            }
        }
    }

    pub fn run_on_end(&self, result: &mut crate::BuildResult) {
        for sub in &self.subscriptions.end {
            tracing::debug!(plugin = %sub.plugin_name, "onEnd");
            let mut log = Log::default();
            match (sub.callback)(&*result) {
                Ok(end) => log.extend_from_plugin(&sub.plugin_name, end.errors, end.warnings),
                Err(err) => log.error(plugin_error(&sub.plugin_name, err)),
            }
            result.errors.append(&mut log.errors);
            result.warnings.append(&mut log.warnings);
        }
    }

    fn resolve_import(
        &self,
        specifier: &str,
        importer: Option<&str>,
        kind: ImportKind,
    ) -> HookResolveIdReturn {
        if specifier == STDIN_ID {
            return Ok(Some(internal(STDIN_ID.to_string())));
        }
        // Ids rolldown generates for itself
        if specifier.starts_with('\0') || specifier.starts_with("rolldown:") {
            return Ok(None);
        }
        if importer.is_some() && !self.options.bundle {
            return Ok(Some(external(specifier.to_string())));
        }

        let mut state = self.state.lock();
        let (importer_path, namespace, resolve_dir, source) = match importer {
            None => (
                String::new(),
                FILE_NAMESPACE.to_string(),
                Some(self.cwd.clone()),
                String::new(),
            ),
            Some(id) => match state.modules.get(id) {
                Some(record) => (
                    record.path.clone(),
                    record.namespace.clone(),
                    record.resolve_dir.clone(),
                    record.source.clone(),
                ),
                None => (
                    id.to_string(),
                    FILE_NAMESPACE.to_string(),
                    default_resolve_dir(id, FILE_NAMESPACE),
                    String::new(),
                ),
            },
        };
        let args = OnResolveArgs {
            path: specifier.to_string(),
            importer: importer_path,
            namespace,
            resolve_dir: resolve_dir
                .map(|dir| dir.to_string_lossy().into_owned())
                .unwrap_or_default(),
            kind: match importer {
                None => ResolveKind::EntryPoint,
                Some(_) => resolve_kind(kind),
            },
        };

        let resolution = self.resolve(&mut state, &args, &source);
        let unresolved = || internal(format!("{}{}", UNRESOLVED_PREFIX, specifier));
        let output = match resolution {
            None => unresolved(),
            Some(Resolution::External(_)) if importer.is_none() => {
                state.log.error(Message::new(format!(
                    "The entry point \"{}\" cannot be marked as external",
                    specifier
                )));
                unresolved()
            }
            Some(Resolution::External(specifier)) => external(specifier),
            Some(Resolution::Module {
                path,
                namespace,
                suffix,
            }) => {
                let id = module_id(&path, &namespace, &suffix);
                state
                    .modules
                    .entry(id.clone())
                    .or_insert_with(|| ModuleRecord {
                        path,
                        namespace,
                        suffix,
                        ..Default::default()
                    });
                internal(id)
            }
        };
        Ok(Some(output))
    }

    /// Resolve an import: plugins first, then the default resolver.
    ///
    /// `None` means the failure is already in the log.
    fn resolve(
        &self,
        state: &mut HostState,
        args: &OnResolveArgs,
        importer_source: &str,
    ) -> Option<Resolution> {
        for sub in &self.subscriptions.resolve {
            if !sub.matches(&args.path, &args.namespace) {
                continue;
            }
            tracing::debug!(plugin = %sub.plugin_name, path = %args.path, kind = ?args.kind, "onResolve");
            let result = match (sub.callback)(args) {
                Ok(Some(result)) => result,
                Ok(None) => continue,
                Err(err) => {
                    state.log.error(plugin_error(&sub.plugin_name, err));
                    return None;
                }
            };

            let OnResolveResult {
                plugin_name,
                errors,
                warnings,
                path,
                external,
                side_effects: _,
                namespace,
                suffix,
                watch_files,
                watch_dirs,
            } = result;
            let plugin_name = if plugin_name.is_empty() {
                sub.plugin_name.to_string()
            } else {
                plugin_name
            };
            state.watch(watch_files, watch_dirs);
            let failed = !errors.is_empty();
            state.log.extend_from_plugin(&plugin_name, errors, warnings);
            if failed {
                return None;
            }
            if path.is_empty() && !external {
                continue;
            }
            if external {
                let specifier = if path.is_empty() { args.path.clone() } else { path };
                return Some(Resolution::External(specifier));
            }

            let namespace = if namespace.is_empty() {
                FILE_NAMESPACE.to_string()
            } else {
                namespace
            };
            if namespace == FILE_NAMESPACE && !Path::new(&path).is_absolute() {
                state.log.error(
                    Message::new(format!(
                        "Plugin \"{}\" returned a non-absolute path: {} (set a namespace if this is not a file path)",
                        plugin_name, path
                    ))
                    .from_plugin(plugin_name.as_str()),
                );
                return None;
            }
            return Some(Resolution::Module {
                path,
                namespace,
                suffix,
            });
        }

        let resolve_dir = (!args.resolve_dir.is_empty()).then(|| Path::new(&args.resolve_dir));
        match self.resolver.resolve(&args.path, resolve_dir, args.kind) {
            Ok(Resolved::Path(path)) => Some(Resolution::Module {
                path: path.to_string_lossy().into_owned(),
                namespace: FILE_NAMESPACE.to_string(),
                suffix: String::new(),
            }),
            Ok(Resolved::External(specifier)) => Some(Resolution::External(specifier)),
            Err(mut message) => {
                if message.location.is_none() && !args.importer.is_empty() {
                    let offset = ['"', '\'', '`']
                        .iter()
                        .find_map(|quote| {
                            importer_source.find(&format!("{}{}{}", quote, args.path, quote))
                        });
                    if let Some(offset) = offset {
                        message.location = Some(location_for(
                            &args.importer,
                            &args.namespace,
                            importer_source,
                            offset,
                        ));
                    }
                }
                state.log.error(message);
                None
            }
        }
    }

    fn load_module(&self, id: &str) -> HookLoadReturn {
        if id.starts_with(UNRESOLVED_PREFIX) {
            return Ok(Some(script(String::new(), ModuleType::Js)));
        }
        let mut state = self.state.lock();
        let Some(record) = state.modules.get(id).cloned() else {
            return Ok(None);
        };

        let loaded = match (&self.options.stdin, id == STDIN_ID) {
            (Some(stdin), true) => Some(Loaded {
                bytes: stdin.contents.clone().into_bytes(),
                loader: stdin.loader,
                resolve_dir: record.resolve_dir.clone(),
            }),
            _ => self.load(&mut state, &record.path, &record.namespace, &record.suffix),
        };
        let Some(loaded) = loaded else {
            return Ok(Some(script(String::new(), ModuleType::Js)));
        };

        let content = match loader::apply(loaded.loader, &record.path, loaded.bytes) {
            Ok(content) => content,
            Err(text) => {
                state.log.error(Message::new(text));
                return Ok(Some(script(String::new(), ModuleType::Js)));
            }
        };
        let content = match content {
            Content::Script { code, loader } if loader.is_script() => {
                // Syntax errors are left for rolldown to report
                let code = apply_define(&code, loader, &self.options.define).unwrap_or(code);
                Content::Script { code, loader }
            }
            Content::Css(css) => {
                state.css.insert(id.to_string(), css.clone());
                Content::Css(css)
            }
            other => other,
        };

        let module_type = content.module_type();
        let code = content.into_code();
        if let Some(record) = state.modules.get_mut(id) {
            record.resolve_dir = loaded.resolve_dir;
            record.source = code.clone();
        }
        Ok(Some(script(code, module_type)))
    }

    /// Load a module: plugins first, then the file system.
    fn load(
        &self,
        state: &mut HostState,
        path: &str,
        namespace: &str,
        suffix: &str,
    ) -> Option<Loaded> {
        let args = OnLoadArgs {
            path: path.to_string(),
            namespace: namespace.to_string(),
            suffix: suffix.to_string(),
        };

        for sub in &self.subscriptions.load {
            if !sub.matches(path, namespace) {
                continue;
            }
            tracing::debug!(plugin = %sub.plugin_name, path, namespace, "onLoad");
            let result = match (sub.callback)(&args) {
                Ok(Some(result)) => result,
                Ok(None) => continue,
                Err(err) => {
                    state.log.error(plugin_error(&sub.plugin_name, err));
                    return None;
                }
            };

            let OnLoadResult {
                plugin_name,
                errors,
                warnings,
                contents,
                resolve_dir,
                loader,
                watch_files,
                watch_dirs,
            } = result;
            let plugin_name = if plugin_name.is_empty() {
                sub.plugin_name.to_string()
            } else {
                plugin_name
            };
            state.watch(watch_files, watch_dirs);
            let failed = !errors.is_empty();
            state.log.extend_from_plugin(&plugin_name, errors, warnings);
            if failed {
                return None;
            }
            let Some(contents) = contents else {
                continue;
            };
            let resolve_dir = if resolve_dir.is_empty() {
                default_resolve_dir(path, namespace)
            } else {
                Some(PathBuf::from(resolve_dir))
            };
            let loader = match loader {
                Loader::Default => self.options.loader_for(path),
                other => other,
            };
            return Some(Loaded {
                bytes: contents.into_bytes(),
                loader,
                resolve_dir,
            });
        }

        if namespace != FILE_NAMESPACE {
            state.log.error(Message::new(format!(
                "Do not know how to load path: {}:{}",
                namespace, path
            )));
            return None;
        }

        match self.fs.read_file(Path::new(path)) {
            Ok(bytes) => {
                state.watch_files.insert(path.to_string());
                Some(Loaded {
                    bytes,
                    loader: self.options.loader_for(path),
                    resolve_dir: default_resolve_dir(path, namespace),
                })
            }
            Err(FsError::NotFound(_)) => {
                state
                    .log
                    .error(Message::new(format!("Could not read \"{}\": file not found", path)));
                None
            }
            Err(err) => {
                state
                    .log
                    .error(Message::new(format!("Could not read \"{}\": {}", path, err)));
                None
            }
        }
    }
}

impl Plugin for PluginHost {
    fn name(&self) -> Cow<'static, str> {
        "kite-plugin-host".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId | HookUsage::Load
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let result = self.resolve_import(args.specifier, args.importer, args.kind);
        async move { result }
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let result = self.load_module(args.id);
        async move { result }
    }
}
