#![deny(clippy::all)]

//! Boundary-safe bindings for the Kite engine.
//!
//! Hosts that cannot pass closures describe plugins as data: a name, an
//! ordered list of filter/callback rules, and optional start and end
//! callbacks, where every callback is an object implementing a
//! single-method trait. [`bridge`] translates such a [`Plugin`] into the
//! engine's native closure protocol.
//!
//! ```
//! use kite_mobile::{
//!     BuildOptions, Builder, Format, LoadFilter, Loader, Plugin, ResolveFilter, StaticLoad,
//!     StaticResolve,
//! };
//! use std::sync::Arc;
//!
//! let mut plugin = Plugin::new("env").unwrap();
//! plugin
//!     .on_resolve(ResolveFilter::path("^env$"), Some(Arc::new(StaticResolve::redirect("env-ns"))))
//!     .unwrap();
//! plugin
//!     .on_load(
//!         LoadFilter::namespace("env-ns"),
//!         Some(Arc::new(StaticLoad::new("module.exports = { debug: true };", Loader::Js))),
//!     )
//!     .unwrap();
//!
//! let mut options = BuildOptions::new();
//! options.format = Format::Cjs;
//! options.add_plugin(plugin);
//!
//! let code = Builder::new(options)
//!     .build("const env = require('env'); module.exports = env.debug;")
//!     .unwrap();
//! assert!(code.contains("debug: true"));
//! ```

pub mod adapter;
pub mod api;
pub mod builders;
pub mod callbacks;
pub mod config;
pub mod conversion;
pub mod error;
pub mod filter;
pub mod options;
pub mod plugin;
pub mod presets;
pub mod types;

// Re-export public API
pub use adapter::{LoadDisposition, ResolveDisposition, bridge, bridge_all};
pub use api::{
    BuildReport, Builder, OutputFile, TransformOptions, TransformReport, transform, version,
};
pub use builders::{BuildSummary, EndOutcome, LoadOutcome, ResolveOutcome, StartOutcome};
pub use callbacks::{
    EndCallback, LoadArgs, LoadCallback, LogStart, ResolveArgs, ResolveCallback, StartCallback,
    StaticLoad, StaticResolve,
};
pub use config::{BridgeConfig, init_logging};
pub use error::{BridgeError, Result};
pub use filter::{LoadFilter, ResolveFilter, filters, namespaces};
pub use kite_engine::{FileSystem, LogLevel, MemoryFileSystem, OsFileSystem};
pub use options::BuildOptions;
pub use plugin::{LoadRule, Plugin, ResolveRule};
pub use types::{Format, Loader, Message, Platform, ResolveKind, SideEffects, Target};
