//! Request authentication.
//!
//! Slack signs every request with `HMAC-SHA256(secret, "v0:{timestamp}:{body}")`
//! and sends the hex digest as `x-slack-signature: v0=<hex>`. Requests whose
//! timestamp is more than the replay window away from the local clock are
//! refused before the signature is checked.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use crate::body::decode_body;
use crate::error::{ValidationError, ValidationResult};
use spaceport_core::{NormalizedEvent, WebhookRequest};

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const CONTENT_TYPE_HEADER: &str = "content-type";

const SIGNATURE_VERSION: &str = "v0";

/// Default maximum clock distance of a request timestamp.
pub const DEFAULT_REPLAY_WINDOW: Duration = Duration::from_secs(300);

/// A request that passed authentication.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    /// JSON text of the decoded body.
    pub canonical_body: String,
    pub event: NormalizedEvent,
}

/// Validates inbound webhook requests against a signing secret.
///
/// Stateless apart from its configuration and safe to share across tasks.
#[derive(Clone)]
pub struct RequestAuthenticator {
    secret: Arc<str>,
    replay_window: Duration,
}

impl RequestAuthenticator {
    pub fn new(signing_secret: impl AsRef<str>) -> Self {
        Self {
            secret: Arc::from(signing_secret.as_ref()),
            replay_window: DEFAULT_REPLAY_WINDOW,
        }
    }

    pub fn with_replay_window(mut self, window: Duration) -> Self {
        self.replay_window = window;
        self
    }

    pub fn replay_window(&self) -> Duration {
        self.replay_window
    }

    /// Validates a request against the current system time.
    pub fn validate(&self, request: &WebhookRequest) -> ValidationResult<ValidatedRequest> {
        self.validate_at(request, SystemTime::now())
    }

    /// Validates a request as if the clock read `now`.
    pub fn validate_at(
        &self,
        request: &WebhookRequest,
        now: SystemTime,
    ) -> ValidationResult<ValidatedRequest> {
        let timestamp = request
            .header(TIMESTAMP_HEADER)
            .ok_or(ValidationError::MissingTimestamp)?;
        self.check_freshness(timestamp, now)?;

        let raw = if request.is_base64_encoded {
            STANDARD
                .decode(request.body.trim())
                .map_err(|e| ValidationError::MalformedBody(format!("invalid base64: {e}")))?
        } else {
            request.body.as_bytes().to_vec()
        };

        let signature = request
            .header(SIGNATURE_HEADER)
            .ok_or(ValidationError::BadSignature)?;
        self.verify_signature(timestamp, &raw, signature)?;

        let body = String::from_utf8(raw)
            .map_err(|_| ValidationError::MalformedBody("body is not UTF-8".into()))?;
        let (canonical_body, event) = decode_body(&body, request.header(CONTENT_TYPE_HEADER))?;

        debug!(bytes = canonical_body.len(), "Request validated");
        Ok(ValidatedRequest {
            canonical_body,
            event,
        })
    }

    fn check_freshness(&self, timestamp: &str, now: SystemTime) -> ValidationResult<()> {
        let sent: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| ValidationError::StaleRequest)?;
        let now = now
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        if now.abs_diff(sent) > self.replay_window.as_secs() {
            return Err(ValidationError::StaleRequest);
        }
        Ok(())
    }

    fn verify_signature(&self, timestamp: &str, body: &[u8], signature: &str) -> ValidationResult<()> {
        let digest = signature
            .strip_prefix(SIGNATURE_VERSION)
            .and_then(|s| s.strip_prefix('='))
            .ok_or(ValidationError::BadSignature)?;
        let expected = hex::decode(digest).map_err(|_| ValidationError::BadSignature)?;

        let mut mac = self.mac(timestamp)?;
        mac.update(body);
        mac.verify_slice(&expected)
            .map_err(|_| ValidationError::BadSignature)
    }

    fn mac(&self, timestamp: &str) -> ValidationResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| ValidationError::BadSignature)?;
        mac.update(SIGNATURE_VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        Ok(mac)
    }
}

impl fmt::Debug for RequestAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestAuthenticator")
            .field("secret", &"<redacted>")
            .field("replay_window", &self.replay_window)
            .finish()
    }
}

/// Computes the `x-slack-signature` value for a body.
pub fn sign(signing_secret: &str, timestamp: &str, body: &[u8]) -> String {
    let authenticator = RequestAuthenticator::new(signing_secret);
    match authenticator.mac(timestamp) {
        Ok(mut mac) => {
            mac.update(body);
            format!(
                "{SIGNATURE_VERSION}={}",
                hex::encode(mac.finalize().into_bytes())
            )
        }
        // HMAC accepts keys of any length.
        Err(_) => String::new(),
    }
}
