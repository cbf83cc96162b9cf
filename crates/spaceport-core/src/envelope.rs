//! The envelope carried across the asynchronous boundary.
//!
//! On the wire an envelope is a flat JSON object:
//!
//! ```json
//! {"source": "slack", "destination": "spaceport", "endpoint": "/events", "body": "{...}"}
//! ```
//!
//! `body` is the validated event serialized as a JSON string. The consuming
//! side parses it back and dispatches without authenticating again.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::category::Endpoint;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::event::NormalizedEvent;

/// Source tag for envelopes produced from platform webhooks.
pub const PLATFORM_SOURCE: &str = "slack";

/// A cross-boundary message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub source: String,
    pub destination: String,
    pub endpoint: Endpoint,
    pub body: String,
}

/// The parts recovered from an [`Envelope`].
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEnvelope {
    pub event: NormalizedEvent,
    pub source: String,
    pub destination: String,
    pub endpoint: Endpoint,
}

impl Envelope {
    /// Packages an already-serialized, validated body.
    ///
    /// The body is carried byte for byte.
    pub fn new(
        body: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
        endpoint: Endpoint,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            endpoint,
            body: body.into(),
        }
    }

    /// Serializes `event` and packages it.
    pub fn encode(
        event: &NormalizedEvent,
        source: impl Into<String>,
        destination: impl Into<String>,
        endpoint: Endpoint,
    ) -> EnvelopeResult<Self> {
        let body = event
            .to_json()
            .map_err(|e| EnvelopeError::Serialize(e.to_string()))?;
        Ok(Self::new(body, source, destination, endpoint))
    }

    /// Recovers the event and routing fields.
    pub fn decode(&self) -> EnvelopeResult<DecodedEnvelope> {
        let event = NormalizedEvent::from_json(&self.body)?;
        Ok(DecodedEnvelope {
            event,
            source: self.source.clone(),
            destination: self.destination.clone(),
            endpoint: self.endpoint,
        })
    }

    /// Returns `true` if the envelope carries the given origin tag.
    ///
    /// Producers tag webhook-originated envelopes with [`PLATFORM_SOURCE`]
    /// unless configured otherwise.
    pub fn originated_from(&self, source: &str) -> bool {
        self.source == source
    }

    /// Serializes the envelope to its transport payload.
    pub fn to_json(&self) -> EnvelopeResult<String> {
        serde_json::to_string(self).map_err(|e| EnvelopeError::Serialize(e.to_string()))
    }

    /// Parses a transport payload.
    pub fn from_json(json: &str) -> EnvelopeResult<Self> {
        serde_json::from_str(json).map_err(|e| EnvelopeError::Deserialize(e.to_string()))
    }

    /// Interprets an already-parsed transport payload.
    pub fn from_value(value: Value) -> EnvelopeResult<Self> {
        serde_json::from_value(value).map_err(|e| EnvelopeError::Deserialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_event() -> NormalizedEvent {
        NormalizedEvent::from_value(json!({
            "type": "event_callback",
            "count": 3,
            "ratio": 0.5,
            "ok": true,
            "missing": null,
            "event": { "type": "app_mention", "text": "hi <@U1>" },
            "list": [1, "two", [false], { "k": "v" }]
        }))
        .unwrap()
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let event = sample_event();
        let envelope = Envelope::encode(&event, "slack", "spaceport", Endpoint::Events).unwrap();
        let wire = envelope.to_json().unwrap();

        let decoded = Envelope::from_json(&wire).unwrap().decode().unwrap();
        assert_eq!(decoded.event, event);
        assert_eq!(decoded.source, "slack");
        assert_eq!(decoded.destination, "spaceport");
        assert_eq!(decoded.endpoint, Endpoint::Events);
    }

    #[test]
    fn test_body_carried_verbatim() {
        let body = r#"{"b":1,  "a":"x"}"#;
        let envelope = Envelope::new(body, "slack", "spaceport", Endpoint::Actions);
        let back = Envelope::from_json(&envelope.to_json().unwrap()).unwrap();
        assert_eq!(back.body, body);
    }

    #[test]
    fn test_wire_shape() {
        let envelope = Envelope::new("{}", "slack", "spaceport", Endpoint::Commands);
        let value: Value = serde_json::from_str(&envelope.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "source": "slack",
                "destination": "spaceport",
                "endpoint": "/commands",
                "body": "{}"
            })
        );
    }

    #[test]
    fn test_decode_rejects_bad_payloads() {
        assert!(matches!(
            Envelope::from_json(r#"{"source":"slack"}"#),
            Err(EnvelopeError::Deserialize(_))
        ));
        assert!(matches!(
            Envelope::from_json(
                r#"{"source":"s","destination":"d","endpoint":"/nope","body":"{}"}"#
            ),
            Err(EnvelopeError::Deserialize(_))
        ));
        let envelope = Envelope::new("[]", "slack", "spaceport", Endpoint::Events);
        assert!(matches!(envelope.decode(), Err(EnvelopeError::Body(_))));
    }

    #[test]
    fn test_platform_origin() {
        let envelope = Envelope::new("{}", PLATFORM_SOURCE, "spaceport", Endpoint::Events);
        assert!(envelope.originated_from(PLATFORM_SOURCE));
        let envelope = Envelope::new("{}", "scheduler", "spaceport", Endpoint::Events);
        assert!(!envelope.originated_from(PLATFORM_SOURCE));
    }
}
