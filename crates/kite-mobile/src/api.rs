//! Host-facing build and transform entry points.

use crate::conversion::{loader_to_native, messages_from_native};
use crate::error::{BridgeError, Result};
use crate::options::BuildOptions;
use crate::types::{Loader, Message};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A file produced by a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    pub path: String,
    pub contents: String,
}

/// Full outcome of a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    /// Text of the first JavaScript output
    pub code: String,
    pub output_files: Vec<OutputFile>,
    pub errors: Vec<Message>,
    pub warnings: Vec<Message>,
    pub watch_files: Vec<String>,
    pub watch_dirs: Vec<String>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// The report, or [`BridgeError::BuildFailed`] when it carries errors.
    pub fn into_result(self) -> Result<Self> {
        if self.errors.is_empty() {
            Ok(self)
        } else {
            Err(BridgeError::build_failed(self.errors))
        }
    }

    fn from_native(result: kite_engine::BuildResult) -> Self {
        Self {
            code: result.js_text().unwrap_or_default(),
            output_files: result
                .output_files
                .iter()
                .map(|file| OutputFile {
                    path: file.path.to_string_lossy().into_owned(),
                    contents: file.text(),
                })
                .collect(),
            errors: messages_from_native(&result.errors),
            warnings: messages_from_native(&result.warnings),
            watch_files: result.watch_files,
            watch_dirs: result.watch_dirs,
        }
    }
}

/// Runs builds for one set of options.
///
/// Each call bridges the attached plugins afresh, so one `Builder` can be
/// reused; builds on different threads should use separate instances.
///
/// ```
/// use kite_mobile::{BuildOptions, Builder, Format};
///
/// let mut options = BuildOptions::new();
/// options.format = Format::Cjs;
/// let code = Builder::new(options).build("module.exports = { answer: 42 };").unwrap();
/// assert!(code.contains("answer: 42"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    options: BuildOptions,
}

impl Builder {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut BuildOptions {
        &mut self.options
    }

    /// Bundle `code` as the entry module and return the output text.
    pub fn build(&self, code: &str) -> Result<String> {
        self.build_report(code).into_result().map(|report| report.code)
    }

    /// Bundle `code` as the entry module. Never fails; diagnostics are on
    /// the report.
    pub fn build_report(&self, code: &str) -> BuildReport {
        BuildReport::from_native(self.execute(Some(code)))
    }

    /// Bundle the configured entry points.
    pub fn run(&self) -> Result<BuildReport> {
        let result = self.execute(None).into_result()?;
        Ok(BuildReport::from_native(result))
    }

    fn execute(&self, stdin: Option<&str>) -> kite_engine::BuildResult {
        let options = self.options.to_native(stdin);
        tracing::debug!(
            plugins = options.plugins.len(),
            stdin = stdin.is_some(),
            "starting build"
        );
        kite_engine::build(&options)
    }
}

/// Options for [`transform`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformOptions {
    pub loader: Loader,
    pub sourcefile: String,
    pub define: BTreeMap<String, String>,
    pub banner: String,
    pub footer: String,
    pub minify_whitespace: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformReport {
    pub code: String,
    pub errors: Vec<Message>,
    pub warnings: Vec<Message>,
}

/// Transform a single module without resolving its imports.
pub fn transform(code: &str, options: &TransformOptions) -> TransformReport {
    let mut native = kite_engine::TransformOptions::new()
        .loader(loader_to_native(options.loader))
        .minify_whitespace(options.minify_whitespace);
    if !options.sourcefile.is_empty() {
        native = native.sourcefile(options.sourcefile.as_str());
    }
    if !options.banner.is_empty() {
        native = native.banner(options.banner.as_str());
    }
    if !options.footer.is_empty() {
        native = native.footer(options.footer.as_str());
    }
    for (key, value) in &options.define {
        native = native.define(key.as_str(), value.as_str());
    }

    let result = kite_engine::transform(code, &native);
    TransformReport {
        code: result.code,
        errors: messages_from_native(&result.errors),
        warnings: messages_from_native(&result.warnings),
    }
}

/// Version of the bridge.
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
