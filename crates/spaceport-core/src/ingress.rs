//! Transport-level request and response types.
//!
//! A transport (HTTP server, queue consumer, function gateway) converts what
//! it receives into a [`TransportEvent`] and renders the resulting
//! [`IngressResponse`] back in its own terms.

use std::collections::HashMap;

use serde_json::{Value, json};
use tracing::debug;

use crate::envelope::Envelope;

// =============================================================================
// Webhook Request
// =============================================================================

/// A raw inbound webhook call, before authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookRequest {
    /// Routing metadata, e.g. `POST /events` or `/events`.
    pub route: String,
    /// Header names are stored lowercased.
    headers: HashMap<String, String>,
    /// The body exactly as delivered.
    pub body: String,
    /// Whether `body` is base64 of the signed bytes.
    pub is_base64_encoded: bool,
}

impl WebhookRequest {
    pub fn new(route: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            headers: HashMap::new(),
            body: body.into(),
            is_base64_encoded: false,
        }
    }

    /// Adds a header; names are case-insensitive.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert_header(name, value);
        self
    }

    pub fn with_base64_body(mut self, encoded: bool) -> Self {
        self.is_base64_encoded = encoded;
        self
    }

    pub fn insert_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Builds a request from a gateway proxy payload.
    ///
    /// Missing `headers` or `body` become empty; non-string header values are
    /// ignored.
    pub fn from_gateway(route: &str, raw: &Value) -> Self {
        let mut request = WebhookRequest::new(
            route,
            raw.get("body").and_then(Value::as_str).unwrap_or_default(),
        );
        request.is_base64_encoded = raw
            .get("isBase64Encoded")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if let Some(headers) = raw.get("headers").and_then(Value::as_object) {
            for (name, value) in headers {
                if let Some(value) = value.as_str() {
                    request.insert_header(name, value);
                }
            }
        }
        request
    }
}

// =============================================================================
// Transport Event
// =============================================================================

/// The classified form of anything a transport hands to the router.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Initialize and do nothing.
    Warmup,
    /// A direct inbound webhook call.
    Webhook(WebhookRequest),
    /// An envelope delivered by the asynchronous transport.
    Queued(Envelope),
    /// Anything else, dispatched to the `nonslack` chain.
    Other(Value),
}

impl TransportEvent {
    /// Classifies a raw gateway-style payload.
    ///
    /// Checked in order: a truthy `warmup` key, a string `routeKey`, an object
    /// that deserializes as an [`Envelope`], and finally anything else.
    pub fn classify(raw: Value) -> Self {
        if raw.get("warmup").is_some_and(is_truthy) {
            return TransportEvent::Warmup;
        }

        if let Some(route) = raw.get("routeKey").and_then(Value::as_str) {
            return TransportEvent::Webhook(WebhookRequest::from_gateway(route, &raw));
        }

        if looks_like_envelope(&raw) {
            match Envelope::from_value(raw.clone()) {
                Ok(envelope) => return TransportEvent::Queued(envelope),
                Err(e) => debug!(error = %e, "Payload has envelope fields but does not decode"),
            }
        }

        TransportEvent::Other(raw)
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportEvent::Warmup => "warmup",
            TransportEvent::Webhook(_) => "webhook",
            TransportEvent::Queued(_) => "queued",
            TransportEvent::Other(_) => "other",
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

fn looks_like_envelope(raw: &Value) -> bool {
    ["source", "destination", "endpoint", "body"]
        .iter()
        .all(|key| raw.get(key).is_some())
}

// =============================================================================
// Ingress Response
// =============================================================================

/// The outward result of handling one transport event.
#[derive(Debug, Clone, PartialEq)]
pub enum IngressResponse {
    /// Nothing to say (warm-up, asynchronous dispatch).
    Empty,
    /// A bare HTTP status with no body.
    Status(u16),
    /// A `200` with a JSON body.
    Json(Value),
}

impl IngressResponse {
    pub fn ok() -> Self {
        IngressResponse::Status(200)
    }

    pub fn unauthorized() -> Self {
        IngressResponse::Status(401)
    }

    pub fn bad_request() -> Self {
        IngressResponse::Status(400)
    }

    pub fn server_error() -> Self {
        IngressResponse::Status(500)
    }

    pub fn json(value: Value) -> Self {
        IngressResponse::Json(value)
    }

    /// The HTTP status this response maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            IngressResponse::Empty | IngressResponse::Json(_) => 200,
            IngressResponse::Status(code) => *code,
        }
    }

    /// Renders the response the way a function gateway expects it.
    pub fn into_gateway_value(self) -> Value {
        match self {
            IngressResponse::Empty => Value::Null,
            IngressResponse::Status(code) => json!({ "statusCode": code }),
            IngressResponse::Json(body) => json!({
                "statusCode": 200,
                "headers": { "content-type": "application/json" },
                "body": body.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Endpoint;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = WebhookRequest::new("/events", "{}")
            .with_header("X-Slack-Request-Timestamp", "123");
        assert_eq!(request.header("x-slack-request-timestamp"), Some("123"));
        assert_eq!(request.header("X-SLACK-REQUEST-TIMESTAMP"), Some("123"));
        assert_eq!(request.header("x-slack-signature"), None);
    }

    #[test]
    fn test_classify_warmup_first() {
        let raw = json!({ "warmup": true, "routeKey": "POST /events" });
        assert_eq!(TransportEvent::classify(raw), TransportEvent::Warmup);
        let raw = json!({ "warmup": false });
        assert!(matches!(
            TransportEvent::classify(raw),
            TransportEvent::Other(_)
        ));
    }

    #[test]
    fn test_classify_gateway_webhook() {
        let raw = json!({
            "routeKey": "POST /commands",
            "headers": { "Content-Type": "application/x-www-form-urlencoded", "n": 1 },
            "body": "Y29tbWFuZD0lMkZzYW1wbGU=",
            "isBase64Encoded": true
        });
        let TransportEvent::Webhook(request) = TransportEvent::classify(raw) else {
            panic!("expected webhook");
        };
        assert_eq!(request.route, "POST /commands");
        assert!(request.is_base64_encoded);
        assert_eq!(
            request.header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(request.header("n"), None);
    }

    #[test]
    fn test_classify_envelope_and_other() {
        let raw = json!({
            "source": "slack",
            "destination": "spaceport",
            "endpoint": "/actions",
            "body": "{}"
        });
        let TransportEvent::Queued(envelope) = TransportEvent::classify(raw) else {
            panic!("expected envelope");
        };
        assert_eq!(envelope.endpoint, Endpoint::Actions);

        let raw = json!({ "detail-type": "Scheduled Event" });
        assert_eq!(
            TransportEvent::classify(raw.clone()),
            TransportEvent::Other(raw)
        );
    }

    #[test]
    fn test_gateway_rendering() {
        assert_eq!(IngressResponse::Empty.into_gateway_value(), Value::Null);
        assert_eq!(
            IngressResponse::unauthorized().into_gateway_value(),
            json!({ "statusCode": 401 })
        );
        let rendered = IngressResponse::json(json!({ "challenge": "abc" })).into_gateway_value();
        assert_eq!(rendered["statusCode"], 200);
        assert_eq!(rendered["body"], r#"{"challenge":"abc"}"#);
    }
}
