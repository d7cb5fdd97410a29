//! Bridge configuration.
//!
//! Sources, lowest priority first: built-in defaults, `kite.toml`, then
//! `KITE_*` environment variables (`KITE_FORMAT=esm`, `KITE_LOG_LEVEL=debug`).

use crate::error::Result;
use crate::options::BuildOptions;
use crate::types::{Format, Platform, Target};
use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use kite_engine::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default file name looked up in the current directory.
pub const CONFIG_FILE: &str = "kite.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub log_level: LogLevel,
    /// Maximum diagnostics logged per build (0 = unlimited)
    pub log_limit: u32,
    pub format: Format,
    pub platform: Platform,
    pub target: Target,
    pub bundle: bool,
    pub minify: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Warn,
            log_limit: 10,
            format: Format::Default,
            platform: Platform::Browser,
            target: Target::EsNext,
            bundle: true,
            minify: false,
        }
    }
}

impl BridgeConfig {
    /// Load from `kite.toml` in the current directory, if present.
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load from the TOML file at `path`. A missing file is not an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("KITE_"))
            .extract()?;
        tracing::debug!(path = %path.display(), ?config, "loaded bridge configuration");
        Ok(config)
    }

    /// Copy the configured defaults onto `options`. Entry points, plugins,
    /// and other per-build fields are left alone.
    pub fn apply(&self, options: &mut BuildOptions) {
        options.format = self.format;
        options.platform = self.platform;
        options.target = self.target;
        options.bundle = self.bundle;
        options.log_limit = self.log_limit;
        options.set_minify(self.minify);
    }

    /// Fresh options with this configuration applied.
    pub fn build_options(&self) -> BuildOptions {
        let mut options = BuildOptions::new();
        self.apply(&mut options);
        options
    }
}

/// Install the global `tracing` subscriber at the configured level. Only the
/// first call in a process has any effect.
pub fn init_logging(config: &BridgeConfig) {
    kite_engine::init_logging(config.log_level);
}
