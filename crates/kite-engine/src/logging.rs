//! Subscriber setup for applications embedding the engine.
//!
//! Only compiled with the `logging` feature. Libraries should leave the
//! subscriber to their host; the engine itself only emits `tracing` events.
//!
//! The installed filter is scoped to the `kite_*` crates so a host's own
//! targets are unaffected. `RUST_LOG` directives are added on top.

use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Environment variable read by [`init_logging_from_env`].
pub const LOG_ENV: &str = "KITE_LOG";

const TARGETS: [&str; 2] = ["kite_engine", "kite_mobile"];

/// Verbosity of the `kite_*` targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Silent,
    Error,
    Warn,
    /// One line per build
    #[default]
    Info,
    /// Every hook invocation and resolution
    Debug,
}

impl LogLevel {
    pub fn level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Silent => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
        }
    }

    /// `EnvFilter` directives enabling this level for the `kite_*` targets.
    fn directives(&self) -> String {
        TARGETS
            .iter()
            .map(|target| format!("{}={}", target, self))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "silent" | "off" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "trace" => Ok(LogLevel::Debug),
            other => Err(format!("Invalid log level: {}", other)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LogLevel::Silent => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        })
    }
}

/// Install a compact stderr subscriber for the `kite_*` targets at `level`.
///
/// Only the first call in a process has any effect, and a subscriber the
/// host installed earlier is left in place.
///
/// ```rust,no_run
/// use kite_engine::logging::{LogLevel, init_logging};
///
/// init_logging(LogLevel::Debug);
/// ```
pub fn init_logging(level: LogLevel) {
    INIT.call_once(|| install(level));
}

/// Like [`init_logging`], with the level taken from `KITE_LOG`.
///
/// An unset or unparseable `KITE_LOG` means [`LogLevel::Info`].
pub fn init_logging_from_env() {
    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or_default();
    init_logging(level);
}

fn install(level: LogLevel) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::OFF.into())
        .parse_lossy(level.directives());
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(extra) => extra
            .split(',')
            .filter_map(|directive| directive.parse::<Directive>().ok())
            .fold(filter, |filter, directive| filter.add_directive(directive)),
        Err(_) => filter,
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false).without_time())
        .try_init();
}
