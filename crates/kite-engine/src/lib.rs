#![cfg_attr(docsrs, feature(doc_cfg))]

//! # kite-engine
//!
//! Synchronous front end to the rolldown bundler with an esbuild-style,
//! closure-based plugin protocol. Rolldown and oxc parse, link, and print;
//! this crate runs plugin callbacks inside a rolldown plugin and collects
//! their diagnostics.
//!
//! ## Quick Start
//!
//! ```
//! use kite_engine::{BuildOptions, Format, MemoryFileSystem, build};
//! use std::sync::Arc;
//!
//! let fs = MemoryFileSystem::new()
//!     .with_file("/app/index.js", "import { add } from './math.js';\nexport default add(1, 2);\n")
//!     .with_file("/app/math.js", "export const add = (a, b) => a + b;\n");
//!
//! let result = build(
//!     &BuildOptions::new("./index.js")
//!         .working_dir("/app")
//!         .format(Format::Esm)
//!         .fs(Arc::new(fs)),
//! );
//! assert!(result.is_success());
//! let js = result.js_text().unwrap();
//! assert!(js.contains("a + b") && js.contains("export"));
//! ```
//!
//! ## Plugins
//!
//! See [`Plugin`]. Plugins are consulted in the order they are attached and,
//! within a plugin, in registration order; the first callback that returns a
//! result wins.

pub mod diagnostics;
pub mod fs;
pub mod loader;
pub mod options;
pub mod plugin;
pub mod resolver;
pub mod transform;

mod build;
mod host;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use build::{BuildResult, OutputFile, build};
pub use diagnostics::{Location, Message, Note, Severity};
pub use fs::{FileSystem, FsError, FsResult, MemoryFileSystem, OsFileSystem};
pub use loader::Loader;
pub use options::{BuildOptions, Format, Platform, StdinOptions, Target};
pub use plugin::{
    FILE_NAMESPACE, OnEndResult, OnLoadArgs, OnLoadOptions, OnLoadResult, OnResolveArgs,
    OnResolveOptions, OnResolveResult, OnStartResult, Plugin, PluginBuild, ResolveKind,
    SideEffects, SubscriptionSummary, inspect_subscriptions,
};
pub use transform::{TransformOptions, TransformResult, transform};

/// Error types for kite-engine operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A plugin's setup function failed.
    #[error("Plugin \"{plugin}\" setup failed: {message}")]
    PluginSetup { plugin: String, message: String },

    /// The build finished with errors.
    #[error("Build failed with {}", format_build_errors(.0))]
    Build(Vec<Message>),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] FsError),
}

/// Result type alias for kite-engine operations.
pub type Result<T> = std::result::Result<T, Error>;

fn format_build_errors(errors: &[Message]) -> String {
    match errors {
        [] => "an unknown error".to_string(),
        [only] => format!("1 error: {}", only),
        many => format!(
            "{} errors: {}",
            many.len(),
            many.iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        ),
    }
}

impl BuildResult {
    /// Turn a result with errors into [`Error::Build`].
    pub fn into_result(self) -> Result<BuildResult> {
        if self.errors.is_empty() {
            Ok(self)
        } else {
            Err(Error::Build(self.errors))
        }
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::PluginSetup { .. } => "KITE_SETUP_ERROR",
            Error::Build(_) => "KITE_BUILD_ERROR",
            Error::InvalidConfig(_) => "KITE_INVALID_CONFIG",
            Error::Io(_) => "KITE_IO_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::PluginSetup { plugin, .. } => Some(Box::new(format!(
                "Check the filters registered by plugin \"{}\"; they must be valid regular expressions.",
                plugin
            ))),
            Error::Build(errors) if errors.len() > 1 => Some(Box::new(
                "Multiple build errors occurred. See details below.".to_string(),
            )),
            Error::InvalidConfig(msg) => Some(Box::new(format!(
                "Check your configuration file for syntax errors.\nError: {}",
                msg
            ))),
            _ => None,
        }
    }
}
