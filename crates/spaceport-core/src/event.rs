//! The normalized event model.
//!
//! Every inbound body, whatever its wire encoding, is decoded into a
//! [`NormalizedEvent`]: a string-keyed tree of JSON values. Handlers receive it
//! behind an `Arc` and can only read it, so siblings in a chain never observe
//! each other's changes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::EventError;

/// A decoded inbound event.
///
/// The wrapper is read-only once constructed. Use [`NormalizedEvent::to_json`]
/// to carry it forward across a process boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedEvent(Map<String, Value>);

impl NormalizedEvent {
    /// Creates an empty event.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Parses a JSON document that must be an object.
    pub fn from_json(json: &str) -> Result<Self, EventError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| EventError::InvalidJson(e.to_string()))?;
        Self::from_value(value)
    }

    /// Wraps an already-parsed value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, EventError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(EventError::NotAnObject(value_kind(&other))),
        }
    }

    /// Builds an event from string pairs. Later duplicates win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        )
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the value under `key` if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Looks up a nested value with a JSON pointer such as `/event/type`.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        if pointer.is_empty() {
            return None;
        }
        let mut parts = pointer.strip_prefix('/')?.splitn(2, '/');
        let head = parts.next()?;
        let value = self.0.get(head)?;
        match parts.next() {
            Some(rest) => value.pointer(&format!("/{rest}")),
            None => Some(value),
        }
    }

    /// Returns the top-level `type` field.
    pub fn event_type(&self) -> Option<&str> {
        self.get_str("type")
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the event has no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the event and returns the underlying map.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Serializes the event to a compact JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }
}

impl From<Map<String, Value>> for NormalizedEvent {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<NormalizedEvent> for Value {
    fn from(event: NormalizedEvent) -> Self {
        Value::Object(event.0)
    }
}

impl fmt::Display for NormalizedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json() {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str("{..}"),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_object() {
        let event = NormalizedEvent::from_json(r#"{"type":"app_mention","n":1}"#).unwrap();
        assert_eq!(event.event_type(), Some("app_mention"));
        assert_eq!(event.get("n"), Some(&json!(1)));
        assert_eq!(event.len(), 2);
    }

    #[test]
    fn test_rejects_non_object() {
        assert_eq!(
            NormalizedEvent::from_json("[1,2]"),
            Err(EventError::NotAnObject("array"))
        );
        assert!(matches!(
            NormalizedEvent::from_json("not json"),
            Err(EventError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_from_pairs_last_wins() {
        let event = NormalizedEvent::from_pairs([("a", "1"), ("b", "2"), ("a", "3")]);
        assert_eq!(event.get_str("a"), Some("3"));
        assert_eq!(event.get_str("b"), Some("2"));
    }

    #[test]
    fn test_pointer_lookup() {
        let event = NormalizedEvent::from_value(json!({
            "event": { "type": "message", "blocks": [{ "id": "b1" }] }
        }))
        .unwrap();
        assert_eq!(event.pointer("/event/type"), Some(&json!("message")));
        assert_eq!(event.pointer("/event/blocks/0/id"), Some(&json!("b1")));
        assert_eq!(event.pointer("/missing"), None);
        assert_eq!(event.pointer(""), None);
    }
}
