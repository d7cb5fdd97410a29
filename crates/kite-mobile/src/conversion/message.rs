use crate::types::Message;
use kite_engine as native;

/// Flatten a native diagnostic. Notes have no boundary counterpart and are
/// dropped.
pub fn message_from_native(message: &native::Message) -> Message {
    let mut out = Message {
        text: message.text.clone(),
        plugin_name: message.plugin_name.clone(),
        ..Default::default()
    };
    if let Some(location) = &message.location {
        out.file = location.file.clone();
        out.namespace = location.namespace.clone();
        out.line = location.line;
        out.column = location.column;
        out.line_text = location.line_text.clone();
    }
    out
}

/// A message with an empty `file` becomes a location-less native message.
pub fn message_to_native(message: &Message) -> native::Message {
    let location = message.has_location().then(|| native::Location {
        file: message.file.clone(),
        namespace: message.namespace.clone(),
        line: message.line,
        column: message.column,
        length: 0,
        line_text: message.line_text.clone(),
    });
    native::Message {
        plugin_name: message.plugin_name.clone(),
        text: message.text.clone(),
        location,
        notes: Vec::new(),
    }
}

pub fn messages_from_native(messages: &[native::Message]) -> Vec<Message> {
    messages.iter().map(message_from_native).collect()
}

pub fn messages_to_native(messages: &[Message]) -> Vec<native::Message> {
    messages.iter().map(message_to_native).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_is_flattened() {
        let native_message = native::Message::new("bad import")
            .from_plugin("p")
            .at(native::Location {
                file: "/app/a.js".into(),
                namespace: "file".into(),
                line: 2,
                column: 7,
                length: 3,
                line_text: "import x from 'y';".into(),
            })
            .with_note("a note");
        let message = message_from_native(&native_message);
        assert_eq!(message.text, "bad import");
        assert_eq!(message.plugin_name, "p");
        assert_eq!(message.line, 2);
        assert_eq!(message.column, 7);

        let back = message_to_native(&message);
        assert_eq!(back.location.as_ref().map(|l| l.line), Some(2));
        assert!(back.notes.is_empty());
    }

    #[test]
    fn test_messages_without_file_have_no_location() {
        let native_message = message_to_native(&Message::new("plain"));
        assert!(native_message.location.is_none());
        assert!(native_message.plugin_name.is_empty());
    }
}
