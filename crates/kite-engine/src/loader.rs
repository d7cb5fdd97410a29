//! Module loaders.
//!
//! A loader decides how the raw bytes of a module reach rolldown: as
//! JavaScript, TypeScript, JSX, or JSON source, or as a stylesheet collected
//! into the `.css` output. Plugins may pick a loader explicitly from
//! `on_load`; when they leave it as [`Loader::Default`] the engine infers one
//! from the path.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rolldown_common::ModuleType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Loader {
    /// Infer from the file extension
    #[default]
    Default,
    Js,
    Jsx,
    Ts,
    Tsx,
    Json,
    Css,
    Text,
    Base64,
    DataUrl,
    Empty,
}

impl Loader {
    /// Infer a loader from a module path, falling back to JavaScript.
    pub fn from_path(path: &str) -> Self {
        // Strip query/hash suffixes that plugins may attach
        let clean = path.split(['?', '#']).next().unwrap_or(path);
        match Path::new(clean).extension().and_then(|e| e.to_str()) {
            Some("js") | Some("mjs") | Some("cjs") => Loader::Js,
            Some("jsx") => Loader::Jsx,
            Some("ts") | Some("mts") | Some("cts") => Loader::Ts,
            Some("tsx") => Loader::Tsx,
            Some("json") => Loader::Json,
            Some("css") => Loader::Css,
            Some("txt") => Loader::Text,
            _ => Loader::Js,
        }
    }

    /// Resolve `Default` against a path.
    pub fn or_infer(self, path: &str) -> Self {
        match self {
            Loader::Default => Loader::from_path(path),
            other => other,
        }
    }

    /// Whether the module is parsed as a script.
    pub fn is_script(self) -> bool {
        matches!(self, Loader::Js | Loader::Jsx | Loader::Ts | Loader::Tsx)
    }

    /// Whether the loader relies on syntax lowering [`transform`](crate::transform)
    /// does not perform. Bundles are lowered by rolldown.
    pub fn needs_lowering(self) -> bool {
        matches!(self, Loader::Jsx | Loader::Ts | Loader::Tsx)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Loader::Default => "default",
            Loader::Js => "js",
            Loader::Jsx => "jsx",
            Loader::Ts => "ts",
            Loader::Tsx => "tsx",
            Loader::Json => "json",
            Loader::Css => "css",
            Loader::Text => "text",
            Loader::Base64 => "base64",
            Loader::DataUrl => "dataurl",
            Loader::Empty => "empty",
        }
    }
}

impl FromStr for Loader {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Loader::Default),
            "js" => Ok(Loader::Js),
            "jsx" => Ok(Loader::Jsx),
            "ts" => Ok(Loader::Ts),
            "tsx" => Ok(Loader::Tsx),
            "json" => Ok(Loader::Json),
            "css" => Ok(Loader::Css),
            "text" => Ok(Loader::Text),
            "base64" => Ok(Loader::Base64),
            "dataurl" => Ok(Loader::DataUrl),
            "empty" => Ok(Loader::Empty),
            other => Err(format!("Invalid loader: {}", other)),
        }
    }
}

impl std::fmt::Display for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Module content after a loader has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Content {
    /// Source handed to rolldown's parser. `loader` is one of the script
    /// loaders or `json`.
    Script { code: String, loader: Loader },
    /// Stylesheet collected into the `.css` output
    Css(String),
}

impl Content {
    /// Module type rolldown parses the content as.
    pub fn module_type(&self) -> ModuleType {
        match self {
            Content::Script { loader, .. } => match loader {
                Loader::Jsx => ModuleType::Jsx,
                Loader::Ts => ModuleType::Ts,
                Loader::Tsx => ModuleType::Tsx,
                Loader::Json => ModuleType::Json,
                _ => ModuleType::Js,
            },
            // The stylesheet itself is collected by the host
            Content::Css(_) => ModuleType::Js,
        }
    }

    /// Code rolldown receives for this module.
    pub fn into_code(self) -> String {
        match self {
            Content::Script { code, .. } => code,
            Content::Css(_) => "export {};".to_string(),
        }
    }
}

/// Turn raw module bytes into script or stylesheet source.
///
/// Binary and text loaders become CommonJS modules exporting a string, so
/// both `require` and a default import see the value.
pub(crate) fn apply(loader: Loader, path: &str, bytes: Vec<u8>) -> Result<Content, String> {
    let utf8 = |bytes: Vec<u8>| {
        String::from_utf8(bytes).map_err(|_| format!("Invalid UTF-8 in \"{}\"", path))
    };
    let script = |code: String, loader: Loader| Content::Script { code, loader };

    let content = match loader.or_infer(path) {
        Loader::Css => Content::Css(utf8(bytes)?),
        Loader::Json => {
            let text = utf8(bytes)?;
            serde_json::from_str::<serde_json::Value>(&text)
                .map_err(|e| format!("Failed to parse JSON in \"{}\": {}", path, e))?;
            script(text, Loader::Json)
        }
        Loader::Text => script(export_string(&utf8(bytes)?), Loader::Js),
        Loader::Base64 => script(export_string(&STANDARD.encode(&bytes)), Loader::Js),
        Loader::DataUrl => script(
            export_string(&format!(
                "data:{};base64,{}",
                mime_type(path),
                STANDARD.encode(&bytes)
            )),
            Loader::Js,
        ),
        Loader::Empty => script(String::new(), Loader::Js),
        loader @ (Loader::Jsx | Loader::Ts | Loader::Tsx) => script(utf8(bytes)?, loader),
        Loader::Default | Loader::Js => script(utf8(bytes)?, Loader::Js),
    };
    Ok(content)
}

fn export_string(value: &str) -> String {
    // Serializing a str cannot fail
    let literal = serde_json::to_string(value).unwrap_or_default();
    format!("module.exports = {};", literal)
}

fn mime_type(path: &str) -> &'static str {
    let clean = path.split(['?', '#']).next().unwrap_or(path);
    match Path::new(clean).extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("txt") => "text/plain",
        Some("css") => "text/css",
        Some("js") | Some("mjs") => "text/javascript",
        Some("json") => "application/json",
        Some("wasm") => "application/wasm",
        _ => "application/octet-stream",
    }
}
