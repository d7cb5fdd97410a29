//! Error types for the bridge.

use crate::conversion::messages_from_native;
use crate::types::Message;

/// Errors surfaced to the host.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A plugin was constructed without a name.
    #[error("Plugin name must not be empty")]
    EmptyPluginName,

    /// A rule was registered without a callback.
    #[error("Plugin \"{plugin}\" registered an {hook} rule for {pattern:?} without a callback")]
    MissingCallback {
        plugin: String,
        hook: &'static str,
        pattern: String,
    },

    /// The build finished with errors. `summary` is the first error's text.
    #[error("Build failed: {summary}")]
    BuildFailed {
        summary: String,
        errors: Vec<Message>,
    },

    /// Configuration could not be loaded.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// Build a [`BridgeError::BuildFailed`] from a non-empty error list.
    pub fn build_failed(errors: Vec<Message>) -> Self {
        let summary = errors
            .first()
            .map(|m| m.text.clone())
            .unwrap_or_else(|| "unknown error".to_string());
        BridgeError::BuildFailed { summary, errors }
    }

    /// Every diagnostic carried by the error.
    pub fn errors(&self) -> &[Message] {
        match self {
            BridgeError::BuildFailed { errors, .. } => errors,
            _ => &[],
        }
    }
}

impl From<figment::Error> for BridgeError {
    fn from(err: figment::Error) -> Self {
        BridgeError::Config(err.to_string())
    }
}

/// Engine failures reach the host as [`BridgeError::BuildFailed`].
impl From<kite_engine::Error> for BridgeError {
    fn from(err: kite_engine::Error) -> Self {
        match err {
            kite_engine::Error::Build(errors) => {
                BridgeError::build_failed(messages_from_native(&errors))
            }
            other => BridgeError::build_failed(vec![Message::new(other.to_string())]),
        }
    }
}

impl miette::Diagnostic for BridgeError {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            BridgeError::EmptyPluginName => "BRIDGE_EMPTY_PLUGIN_NAME",
            BridgeError::MissingCallback { .. } => "BRIDGE_MISSING_CALLBACK",
            BridgeError::BuildFailed { .. } => "BRIDGE_BUILD_FAILED",
            BridgeError::Config(_) => "BRIDGE_CONFIG_ERROR",
        }))
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            BridgeError::EmptyPluginName => Some(Box::new(
                "Give every plugin a unique, non-empty name; it is used to attribute diagnostics.",
            )),
            BridgeError::MissingCallback { .. } => Some(Box::new(
                "Pass a callback object when registering the rule.",
            )),
            BridgeError::BuildFailed { errors, .. } if errors.len() > 1 => Some(Box::new(format!(
                "{} more error(s) are available in the full diagnostic list.",
                errors.len() - 1
            ))),
            BridgeError::Config(_) => Some(Box::new(
                "Check kite.toml and KITE_* environment variables for invalid values.",
            )),
            _ => None,
        }
    }
}
