//! Boundary-safe value types.
//!
//! Everything here is plain data: primitives, strings, and nested plain
//! data. Enumerations carry an explicit discriminant so a host can pass the
//! raw integer across the boundary; raw values the bridge does not know fall
//! back to a named default instead of failing.

use serde::{Deserialize, Serialize};

/// Why a resolve event fired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum ResolveKind {
    /// Conversion fallback; the engine never raises it for a real import
    #[default]
    None = 0,
    EntryPoint = 1,
    JsImportStatement = 2,
    JsRequireCall = 3,
    JsDynamicImport = 4,
    JsRequireResolve = 5,
    CssImportRule = 6,
    CssComposesFrom = 7,
    CssUrlToken = 8,
}

impl ResolveKind {
    /// Decode a raw discriminant. Unknown values map to [`ResolveKind::None`].
    ///
    /// ```
    /// use kite_mobile::ResolveKind;
    ///
    /// assert_eq!(ResolveKind::from_raw(3), ResolveKind::JsRequireCall);
    /// assert_eq!(ResolveKind::from_raw(200), ResolveKind::None);
    /// ```
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => ResolveKind::EntryPoint,
            2 => ResolveKind::JsImportStatement,
            3 => ResolveKind::JsRequireCall,
            4 => ResolveKind::JsDynamicImport,
            5 => ResolveKind::JsRequireResolve,
            6 => ResolveKind::CssImportRule,
            7 => ResolveKind::CssComposesFrom,
            8 => ResolveKind::CssUrlToken,
            _ => ResolveKind::None,
        }
    }

    pub fn as_raw(self) -> u8 {
        self as u8
    }
}

/// Whether a module has side effects. Defaults to `True`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum SideEffects {
    #[default]
    True = 0,
    False = 1,
}

impl SideEffects {
    /// Decode a raw discriminant. Unknown values map to [`SideEffects::True`].
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => SideEffects::False,
            _ => SideEffects::True,
        }
    }
}

/// How module contents returned by a load callback are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum Loader {
    /// Infer from the file extension
    #[default]
    None = 0,
    Js = 1,
    Jsx = 2,
    Ts = 3,
    Tsx = 4,
    Json = 5,
    Css = 6,
    Text = 7,
    Base64 = 8,
    DataUrl = 9,
    Empty = 10,
    /// The engine's own choice for the path. Unlike [`Loader::None`], which
    /// also stands in for unknown raw values, this is always an explicit
    /// request; both map to the same native loader.
    Default = 11,
}

impl Loader {
    /// Decode a raw discriminant. Unknown values map to [`Loader::None`].
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Loader::Js,
            2 => Loader::Jsx,
            3 => Loader::Ts,
            4 => Loader::Tsx,
            5 => Loader::Json,
            6 => Loader::Css,
            7 => Loader::Text,
            8 => Loader::Base64,
            9 => Loader::DataUrl,
            10 => Loader::Empty,
            11 => Loader::Default,
            _ => Loader::None,
        }
    }

    pub fn as_raw(self) -> i32 {
        self as i32
    }
}

/// A diagnostic crossing the boundary.
///
/// Location fields are flattened; `file` is empty when the message has no
/// location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub plugin_name: String,
    pub file: String,
    pub namespace: String,
    /// 1-based; 0 when unknown
    pub line: u32,
    /// 0-based byte column
    pub column: u32,
    pub line_text: String,
}

impl Message {
    /// A message with no location.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_location(
        mut self,
        file: impl Into<String>,
        line: u32,
        column: u32,
        line_text: impl Into<String>,
    ) -> Self {
        self.file = file.into();
        self.line = line;
        self.column = column;
        self.line_text = line_text.into();
        self
    }

    pub fn has_location(&self) -> bool {
        !self.file.is_empty()
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.has_location() {
            write!(f, "{}:{}:{}: ", self.file, self.line, self.column)?;
        }
        if !self.plugin_name.is_empty() {
            write!(f, "[plugin {}] ", self.plugin_name)?;
        }
        f.write_str(&self.text)
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::new(text)
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::new(text)
    }
}

/// Output format of a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Format {
    /// `iife` when bundling, the input unchanged otherwise
    #[default]
    Default = 0,
    Iife = 1,
    Cjs = 2,
    Esm = 3,
}

impl Format {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Format::Iife,
            2 => Format::Cjs,
            3 => Format::Esm,
            _ => Format::Default,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Platform {
    #[default]
    Browser = 0,
    Node = 1,
    Neutral = 2,
}

impl Platform {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Platform::Node,
            2 => Platform::Neutral,
            _ => Platform::Browser,
        }
    }
}

/// Language target. Accepted for compatibility; no syntax lowering happens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Target {
    #[default]
    EsNext = 0,
    Es5 = 1,
    Es2015 = 2,
    Es2016 = 3,
    Es2017 = 4,
    Es2018 = 5,
    Es2019 = 6,
    Es2020 = 7,
    Es2022 = 8,
}

impl Target {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Target::Es5,
            2 => Target::Es2015,
            3 => Target::Es2016,
            4 => Target::Es2017,
            5 => Target::Es2018,
            6 => Target::Es2019,
            7 => Target::Es2020,
            8 => Target::Es2022,
            _ => Target::EsNext,
        }
    }
}
