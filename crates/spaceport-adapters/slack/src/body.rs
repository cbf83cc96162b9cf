//! Body decoding by content type.
//!
//! | Content type | Handling |
//! |---|---|
//! | `application/json` | parsed as is |
//! | `application/x-www-form-urlencoded` | pairs become a flat string map |
//! | anything else | must parse as JSON |
//!
//! The canonical body is the JSON text the event was parsed from. It is what
//! crosses the asynchronous boundary.

use url::form_urlencoded;

use crate::error::{ValidationError, ValidationResult};
use spaceport_core::NormalizedEvent;

/// Wire format of an inbound body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Form,
    Other,
}

impl BodyFormat {
    /// Determines the format from a `Content-Type` value.
    ///
    /// Parameters such as `; charset=utf-8` are ignored and the media type is
    /// compared case-insensitively.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let media_type = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|mt| mt.trim().to_ascii_lowercase());

        match media_type.as_deref() {
            Some("application/json") => BodyFormat::Json,
            Some("application/x-www-form-urlencoded") => BodyFormat::Form,
            _ => BodyFormat::Other,
        }
    }
}

/// Decodes a signed body into its canonical JSON text and event.
pub fn decode_body(
    raw: &str,
    content_type: Option<&str>,
) -> ValidationResult<(String, NormalizedEvent)> {
    match BodyFormat::from_content_type(content_type) {
        BodyFormat::Json | BodyFormat::Other => {
            let event = NormalizedEvent::from_json(raw)
                .map_err(|e| ValidationError::MalformedBody(e.to_string()))?;
            Ok((raw.to_string(), event))
        }
        BodyFormat::Form => {
            let event = NormalizedEvent::from_pairs(form_urlencoded::parse(raw.as_bytes()));
            let canonical = event
                .to_json()
                .map_err(|e| ValidationError::MalformedBody(e.to_string()))?;
            Ok((canonical, event))
        }
    }
}

/// Parses the JSON `payload` field interactive callbacks carry.
///
/// Block actions, view submissions and option requests arrive as a form with
/// a single `payload` field holding the real event.
pub fn interaction_payload(event: &NormalizedEvent) -> Option<NormalizedEvent> {
    NormalizedEvent::from_json(event.get_str("payload")?).ok()
}
