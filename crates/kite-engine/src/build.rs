//! Build driver.
//!
//! A build runs in one synchronous call:
//!
//! 1. plugin setup
//! 2. `on_start` callbacks, then option validation
//! 3. rolldown bundles the inputs while [`PluginHost`] answers its resolve
//!    and load hooks
//! 4. chunks become output files (banner/footer, collected stylesheet)
//! 5. `on_end` callbacks
//! 6. write outputs (when `write` is set)
//!
//! Rolldown is async; the driver blocks on a shared tokio runtime, so
//! [`build`] must not be called from inside another tokio runtime.

use crate::diagnostics::{Log, Message};
use crate::fs::FileSystem;
use crate::host::{PluginHost, STDIN_ID};
use crate::options::{BuildOptions, Format, Platform};
use crate::plugin::Subscriptions;
use crate::transform::with_banner;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use rolldown::{
    BundlerBuilder as RolldownBundlerBuilder, BundlerOptions, InputItem, OutputFormat,
    Platform as RolldownPlatform, RawMinifyOptions,
};
use rolldown_common::Output;
use rolldown_plugin::__inner::SharedPluginable;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Runtime;

/// Runtime shared by every build in the process.
static RUNTIME: Lazy<std::io::Result<Runtime>> = Lazy::new(Runtime::new);

/// A file produced by the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

impl OutputFile {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.contents).into_owned()
    }
}

/// Everything a build reports back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildResult {
    pub errors: Vec<Message>,
    pub warnings: Vec<Message>,
    pub output_files: Vec<OutputFile>,
    /// Files the build read or plugins asked to watch
    pub watch_files: Vec<String>,
    pub watch_dirs: Vec<String>,
}

impl BuildResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Text of the first JavaScript output file, if any.
    pub fn js_text(&self) -> Option<String> {
        self.output_files
            .iter()
            .find(|f| f.path.extension().is_none_or(|ext| ext != "css"))
            .map(OutputFile::text)
    }
}

/// Run a build.
///
/// Diagnostics never abort the call: errors and warnings are collected on
/// the returned [`BuildResult`].
///
/// ```
/// use kite_engine::{BuildOptions, Format, build};
///
/// let result = build(&BuildOptions::stdin("module.exports = \"forty-two\";").format(Format::Cjs));
/// assert!(result.is_success());
/// assert!(result.js_text().unwrap().contains("forty-two"));
/// ```
pub fn build(options: &BuildOptions) -> BuildResult {
    let started = Instant::now();
    let fs = options.file_system();

    let (subscriptions, setup_errors) = Subscriptions::setup(&options.plugins, options);
    if !setup_errors.is_empty() {
        let log = Log {
            errors: setup_errors,
            warnings: Vec::new(),
        };
        log.emit(options.log_limit);
        return BuildResult {
            errors: log.errors,
            ..Default::default()
        };
    }

    let host = Arc::new(PluginHost::new(Arc::new(subscriptions), options));
    host.run_on_start();
    if let Err(err) = options.validate() {
        host.error(Message::new(match err {
            Error::InvalidConfig(text) => text,
            other => other.to_string(),
        }));
    }

    let has_inputs = options.stdin.is_some() || !options.entry_points.is_empty();
    let mut bundled = None;
    if has_inputs && !host.has_errors() {
        match bundle(&host, options) {
            Ok(outputs) => bundled = Some(outputs),
            // Errors the host logged explain the failure better than rolldown's
            Err(message) if !host.has_errors() => host.error(message),
            Err(message) => tracing::debug!(%message, "rolldown failed after host errors"),
        }
    }

    let state = host.take_state();
    let mut output_files = Vec::new();
    if !state.log.has_errors() {
        if let Some((files, entry_path)) = bundled {
            output_files = files;
            if !state.css.is_empty() {
                let css: Vec<&str> = state.css.values().map(String::as_str).collect();
                output_files.push(OutputFile {
                    path: entry_path
                        .unwrap_or_else(|| PathBuf::from("<stdout>"))
                        .with_extension("css"),
                    contents: css.join("\n").into_bytes(),
                });
            }
        }
    }

    let mut result = BuildResult {
        errors: state.log.errors,
        warnings: state.log.warnings,
        output_files,
        watch_files: state.watch_files.into_iter().collect(),
        watch_dirs: state.watch_dirs.into_iter().collect(),
    };

    host.run_on_end(&mut result);

    if options.write && result.errors.is_empty() {
        if let Err(err) = write_outputs(fs.as_ref(), &result.output_files) {
            result
                .errors
                .push(Message::new(format!("Failed to write output files: {}", err)));
        }
    }

    Log {
        errors: result.errors.clone(),
        warnings: result.warnings.clone(),
    }
    .emit(options.log_limit);
    tracing::info!(
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        outputs = result.output_files.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "build finished"
    );
    result
}

/// Write every output file, stopping at the first failure.
fn write_outputs(fs: &dyn FileSystem, files: &[OutputFile]) -> Result<()> {
    for file in files {
        fs.write_file(&file.path, &file.contents)?;
        tracing::debug!(path = %file.path.display(), bytes = file.contents.len(), "wrote output");
    }
    Ok(())
}

fn rolldown_options(options: &BuildOptions) -> BundlerOptions {
    let mut input = Vec::new();
    if options.stdin.is_some() {
        input.push(InputItem {
            name: Some("stdin".to_string()),
            import: STDIN_ID.to_string(),
        });
    }
    input.extend(options.entry_points.iter().map(|entry| InputItem {
        name: None,
        import: entry.clone(),
    }));

    let minify = options.minify_whitespace || options.minify_identifiers || options.minify_syntax;
    BundlerOptions {
        input: Some(input),
        cwd: Some(options.cwd()),
        format: Some(match options.effective_format() {
            Format::Cjs => OutputFormat::Cjs,
            Format::Iife => OutputFormat::Iife,
            Format::Esm | Format::Default => OutputFormat::Esm,
        }),
        platform: Some(match options.platform {
            Platform::Browser => RolldownPlatform::Browser,
            Platform::Node => RolldownPlatform::Node,
            Platform::Neutral => RolldownPlatform::Neutral,
        }),
        name: options.global_name.clone(),
        minify: minify.then(|| RawMinifyOptions::from(true)),
        ..Default::default()
    }
}

/// Bundle with rolldown and turn its chunks into output files.
///
/// Also returns the path of the first entry output, which names the
/// stylesheet.
fn bundle(
    host: &Arc<PluginHost>,
    options: &BuildOptions,
) -> std::result::Result<(Vec<OutputFile>, Option<PathBuf>), Message> {
    let runtime = RUNTIME
        .as_ref()
        .map_err(|err| Message::new(format!("Failed to start the bundler runtime: {}", err)))?;
    let plugin: SharedPluginable = host.clone();

    let output = runtime
        .block_on(async {
            let mut bundler = RolldownBundlerBuilder::default()
                .with_options(rolldown_options(options))
                .with_plugins(vec![plugin])
                .build()
                .map_err(|e| format!("{e:?}"))?;
            bundler.generate().await.map_err(|e| format!("{e:?}"))
        })
        .map_err(|text| Message::new(format!("Bundling failed: {}", text)))?;

    let cwd = options.cwd();
    let banner = options.banner.as_deref();
    let footer = options.footer.as_deref();
    let mut files = Vec::new();
    let mut entry_path = None;
    for item in output.assets {
        match item {
            Output::Chunk(chunk) => {
                let filename = chunk.filename.to_string();
                let path = if chunk.is_entry {
                    entry_output_path(options, &cwd, &filename)
                } else {
                    chunk_output_path(options, &cwd, &filename)
                };
                if chunk.is_entry && entry_path.is_none() {
                    entry_path = Some(path.clone());
                }
                files.push(OutputFile {
                    path,
                    contents: with_banner(chunk.code.clone(), banner, footer).into_bytes(),
                });
            }
            Output::Asset(asset) => files.push(OutputFile {
                path: chunk_output_path(options, &cwd, &asset.filename.to_string()),
                contents: asset.source.as_bytes().to_vec(),
            }),
        }
    }
    Ok((files, entry_path))
}

fn entry_output_path(options: &BuildOptions, cwd: &Path, filename: &str) -> PathBuf {
    if let Some(outfile) = &options.outfile {
        return cwd.join(outfile);
    }
    if let Some(outdir) = &options.outdir {
        return cwd.join(outdir).join(filename);
    }
    PathBuf::from("<stdout>")
}

/// Shared and lazily loaded chunks sit next to the entry output.
fn chunk_output_path(options: &BuildOptions, cwd: &Path, filename: &str) -> PathBuf {
    if let Some(outdir) = &options.outdir {
        return cwd.join(outdir).join(filename);
    }
    match options.outfile.as_ref().and_then(|f| cwd.join(f).parent().map(Path::to_path_buf)) {
        Some(dir) => dir.join(filename),
        None => cwd.join(filename),
    }
}
