//! Boundary build options.
//!
//! Plain data mirroring the engine's options, plus the attached plugins.
//! Empty strings mean "unset".

use crate::adapter::bridge_all;
use crate::conversion::loader_to_native;
use crate::plugin::Plugin;
use crate::types::{Format, Loader, Platform, Target};
use kite_engine as native;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub entry_points: Vec<String>,
    /// Name shown for stdin contents in diagnostics
    pub sourcefile: String,
    /// Directory stdin imports resolve against (defaults to `working_dir`)
    pub resolve_dir: String,
    /// Loader for stdin contents
    pub loader: Loader,
    pub working_dir: String,
    pub bundle: bool,
    pub write: bool,
    pub outfile: String,
    pub outdir: String,
    pub format: Format,
    pub platform: Platform,
    pub target: Target,
    pub minify_whitespace: bool,
    pub minify_identifiers: bool,
    pub minify_syntax: bool,
    pub global_name: String,
    pub define: BTreeMap<String, String>,
    pub external: Vec<String>,
    /// Loader overrides keyed by extension (`".txt"`)
    pub loaders: BTreeMap<String, Loader>,
    pub banner: String,
    pub footer: String,
    pub log_limit: u32,
    plugins: Vec<Plugin>,
    fs: Option<Arc<dyn native::FileSystem>>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            entry_points: Vec::new(),
            sourcefile: String::new(),
            resolve_dir: String::new(),
            loader: Loader::None,
            working_dir: String::new(),
            bundle: true,
            write: false,
            outfile: String::new(),
            outdir: String::new(),
            format: Format::Default,
            platform: Platform::Browser,
            target: Target::EsNext,
            minify_whitespace: false,
            minify_identifiers: false,
            minify_syntax: false,
            global_name: String::new(),
            define: BTreeMap::new(),
            external: Vec::new(),
            loaders: BTreeMap::new(),
            banner: String::new(),
            footer: String::new(),
            log_limit: 10,
            plugins: Vec::new(),
            fs: None,
        }
    }
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a plugin after those already attached.
    pub fn add_plugin(&mut self, plugin: Plugin) {
        self.plugins.push(plugin);
    }

    pub fn clear_plugins(&mut self) {
        self.plugins.clear();
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// The plugin at `index`, or `None` when out of range.
    pub fn plugin(&self, index: usize) -> Option<&Plugin> {
        self.plugins.get(index)
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    /// Set all minification flags at once.
    pub fn set_minify(&mut self, enabled: bool) {
        self.minify_whitespace = enabled;
        self.minify_identifiers = enabled;
        self.minify_syntax = enabled;
    }

    /// Serve files from `fs` instead of the host file system.
    pub fn set_file_system(&mut self, fs: Arc<dyn native::FileSystem>) {
        self.fs = Some(fs);
    }

    /// Engine options for one build. `stdin` replaces the entry points when
    /// given; plugins are bridged afresh.
    pub(crate) fn to_native(&self, stdin: Option<&str>) -> native::BuildOptions {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

        let mut options = native::BuildOptions {
            bundle: self.bundle,
            write: self.write,
            outfile: non_empty(&self.outfile).map(Into::into),
            outdir: non_empty(&self.outdir).map(Into::into),
            format: format_to_native(self.format),
            platform: platform_to_native(self.platform),
            target: target_to_native(self.target),
            minify_whitespace: self.minify_whitespace,
            minify_identifiers: self.minify_identifiers,
            minify_syntax: self.minify_syntax,
            global_name: non_empty(&self.global_name),
            external: self.external.clone(),
            banner: non_empty(&self.banner),
            footer: non_empty(&self.footer),
            log_limit: self.log_limit as usize,
            working_dir: non_empty(&self.working_dir).map(Into::into),
            fs: self.fs.clone(),
            plugins: bridge_all(self.plugins.iter().cloned()),
            ..native::BuildOptions::default()
        };

        for (key, value) in &self.define {
            options.define.insert(key.clone(), value.clone());
        }
        for (extension, loader) in &self.loaders {
            options
                .loaders
                .insert(extension.clone(), loader_to_native(*loader));
        }

        match stdin {
            Some(contents) => {
                let mut stdin = native::StdinOptions::new(contents);
                stdin.sourcefile = non_empty(&self.sourcefile);
                stdin.resolve_dir = non_empty(&self.resolve_dir).map(Into::into);
                stdin.loader = loader_to_native(self.loader);
                options.stdin = Some(stdin);
            }
            None => options.entry_points = self.entry_points.clone(),
        }
        options
    }
}

fn format_to_native(format: Format) -> native::Format {
    match format {
        Format::Default => native::Format::Default,
        Format::Iife => native::Format::Iife,
        Format::Cjs => native::Format::Cjs,
        Format::Esm => native::Format::Esm,
    }
}

fn platform_to_native(platform: Platform) -> native::Platform {
    match platform {
        Platform::Browser => native::Platform::Browser,
        Platform::Node => native::Platform::Node,
        Platform::Neutral => native::Platform::Neutral,
    }
}

fn target_to_native(target: Target) -> native::Target {
    match target {
        Target::EsNext => native::Target::EsNext,
        Target::Es5 => native::Target::Es5,
        Target::Es2015 => native::Target::Es2015,
        Target::Es2016 => native::Target::Es2016,
        Target::Es2017 => native::Target::Es2017,
        Target::Es2018 => native::Target::Es2018,
        Target::Es2019 => native::Target::Es2019,
        Target::Es2020 => native::Target::Es2020,
        Target::Es2022 => native::Target::Es2022,
    }
}
