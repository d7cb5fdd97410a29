//! Build diagnostics.
//!
//! Every error or warning produced during a build, whether raised by the
//! engine itself or returned by a plugin callback, is a [`Message`]. Messages
//! are plain cloneable data so they can be handed to plugin `on_end` hooks and
//! copied across binding layers unchanged.

use serde::{Deserialize, Serialize};

/// Source location attached to a diagnostic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub namespace: String,
    /// 1-based line number
    pub line: u32,
    /// 0-based column in bytes
    pub column: u32,
    pub length: u32,
    pub line_text: String,
}

/// Additional context attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
    pub location: Option<Location>,
}

/// A build error or warning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Name of the plugin that produced the message (empty for engine messages)
    pub plugin_name: String,
    pub text: String,
    pub location: Option<Location>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Message {
    /// Create a message with no location.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Attach a location.
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Attribute the message to a plugin.
    pub fn from_plugin(mut self, plugin_name: impl Into<String>) -> Self {
        self.plugin_name = plugin_name.into();
        self
    }

    /// Append a note.
    pub fn with_note(mut self, text: impl Into<String>) -> Self {
        self.notes.push(Note {
            text: text.into(),
            location: None,
        });
        self
    }

    /// Stamp `plugin_name` on the message unless it already names one.
    pub(crate) fn attribute_to(&mut self, plugin_name: &str) {
        if self.plugin_name.is_empty() {
            self.plugin_name = plugin_name.to_string();
        }
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(loc) = &self.location {
            write!(f, "{}:{}:{}: ", loc.file, loc.line, loc.column)?;
        }
        if !self.plugin_name.is_empty() {
            write!(f, "[plugin {}] ", self.plugin_name)?;
        }
        write!(f, "{}", self.text)
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Collects diagnostics for a single build pass.
#[derive(Debug, Default)]
pub(crate) struct Log {
    pub errors: Vec<Message>,
    pub warnings: Vec<Message>,
}

impl Log {
    pub fn error(&mut self, message: Message) {
        self.errors.push(message);
    }

    pub fn warn(&mut self, message: Message) {
        self.warnings.push(message);
    }

    /// Absorb the diagnostics a plugin callback returned, attributing them
    /// to the plugin when they do not already name one.
    pub fn extend_from_plugin(
        &mut self,
        plugin_name: &str,
        errors: Vec<Message>,
        warnings: Vec<Message>,
    ) {
        for mut message in errors {
            message.attribute_to(plugin_name);
            self.errors.push(message);
        }
        for mut message in warnings {
            message.attribute_to(plugin_name);
            self.warnings.push(message);
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Emit diagnostics through `tracing`, stopping after `limit` entries
    /// (0 means unlimited).
    pub fn emit(&self, limit: usize) {
        let limit = if limit == 0 { usize::MAX } else { limit };
        let all = self
            .errors
            .iter()
            .map(|m| (Severity::Error, m))
            .chain(self.warnings.iter().map(|m| (Severity::Warning, m)));

        let mut shown = 0;
        for (severity, message) in all {
            if shown == limit {
                let hidden = self.errors.len() + self.warnings.len() - shown;
                tracing::warn!("{} more diagnostics not shown", hidden);
                break;
            }
            match severity {
                Severity::Error => tracing::error!("{}", message),
                Severity::Warning => tracing::warn!("{}", message),
            }
            shown += 1;
        }
    }
}

/// Locate the 1-based line, 0-based column, and line text for a byte offset.
pub(crate) fn location_for(file: &str, namespace: &str, source: &str, offset: usize) -> Location {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count() as u32 + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = source[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(source.len());

    Location {
        file: file.to_string(),
        namespace: namespace.to_string(),
        line,
        column: (offset - line_start) as u32,
        length: 0,
        line_text: source[line_start..line_end].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_for_offset() {
        let source = "a\nimport x from 'y';\n";
        let loc = location_for("in.js", "file", source, 9);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 7);
        assert_eq!(loc.line_text, "import x from 'y';");
    }

    #[test]
    fn test_attribution_keeps_existing_plugin_name() {
        let mut log = Log::default();
        log.extend_from_plugin(
            "outer",
            vec![Message::new("a"), Message::new("b").from_plugin("inner")],
            vec![Message::new("c")],
        );
        assert_eq!(log.errors[0].plugin_name, "outer");
        assert_eq!(log.errors[1].plugin_name, "inner");
        assert_eq!(log.warnings[0].plugin_name, "outer");
    }

    #[test]
    fn test_display_includes_plugin_and_location() {
        let msg = Message::new("boom").from_plugin("p").at(Location {
            file: "a.js".into(),
            line: 3,
            column: 4,
            ..Default::default()
        });
        assert_eq!(msg.to_string(), "a.js:3:4: [plugin p] boom");
    }
}
