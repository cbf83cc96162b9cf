//! Block Kit builders.
//!
//! Plain data builders for the message layout objects the sample handlers use.

use serde_json::{Value, json};

/// Rendering of a text object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextKind {
    /// `plain_text` with `emoji: false`.
    Plain,
    /// `plain_text` with `emoji: true`.
    Emoji,
    #[default]
    Mrkdwn,
}

/// A text object.
pub fn text(txt: &str, kind: TextKind) -> Value {
    match kind {
        TextKind::Mrkdwn => json!({ "type": "mrkdwn", "text": txt }),
        TextKind::Emoji => json!({ "type": "plain_text", "text": txt, "emoji": true }),
        TextKind::Plain => json!({ "type": "plain_text", "text": txt, "emoji": false }),
    }
}

pub fn plain_text(txt: &str) -> Value {
    text(txt, TextKind::Plain)
}

pub fn emoji_text(txt: &str) -> Value {
    text(txt, TextKind::Emoji)
}

/// A section block with a single text.
pub fn sec_text(txt: &str, kind: TextKind) -> Value {
    json!({ "type": "section", "text": text(txt, kind) })
}

/// A section block laid out as fields.
pub fn sec_fields<S: AsRef<str>>(fields: &[S], kind: TextKind) -> Value {
    let fields: Vec<Value> = fields.iter().map(|f| text(f.as_ref(), kind)).collect();
    json!({ "type": "section", "fields": fields })
}

/// A context block with a single element.
pub fn con_text(txt: &str, kind: TextKind) -> Value {
    json!({ "type": "context", "elements": [text(txt, kind)] })
}

/// A header block. Headers only accept emoji plain text.
pub fn header(txt: &str) -> Value {
    json!({ "type": "header", "text": emoji_text(txt) })
}

/// An option object for select menus.
pub fn option(value: &str, txt: &str, kind: TextKind) -> Value {
    json!({ "text": text(txt, kind), "value": value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_kinds() {
        assert_eq!(
            text("*hi*", TextKind::default()),
            json!({ "type": "mrkdwn", "text": "*hi*" })
        );
        assert_eq!(plain_text("hi")["emoji"], false);
        assert_eq!(emoji_text("hi")["emoji"], true);
        assert_eq!(emoji_text("hi")["type"], "plain_text");
    }

    #[test]
    fn test_blocks() {
        assert_eq!(header("Title")["text"]["emoji"], true);
        assert_eq!(
            sec_fields(&["a", "b"], TextKind::Mrkdwn)["fields"]
                .as_array()
                .map(Vec::len),
            Some(2)
        );
        assert_eq!(con_text("c", TextKind::Plain)["elements"][0]["text"], "c");
        assert_eq!(
            option("v1", "One", TextKind::Plain),
            json!({ "text": { "type": "plain_text", "text": "One", "emoji": false }, "value": "v1" })
        );
        assert_eq!(sec_text("s", TextKind::Mrkdwn)["type"], "section");
    }
}
