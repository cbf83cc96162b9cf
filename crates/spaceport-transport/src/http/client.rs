//! HTTP client implementations.
//!
//! - [`HttpApiClient`]: the chat Web API over HTTPS with a bot token
//! - [`HttpEnvelopeSink`]: forwards envelopes to a consumer's queue endpoint

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use tracing::{debug, trace};

use spaceport_core::{
    ApiReply, ApiResult, ChatApi, Envelope, EnvelopeSink, TransportError, TransportResult,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

fn build_client(timeout: Duration) -> TransportResult<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .build()
        .map_err(|e| TransportError::Io(format!("failed to create HTTP client: {e}")))
}

// =============================================================================
// Web API client
// =============================================================================

/// [`ChatApi`] over HTTPS.
#[derive(Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpApiClient {
    /// Creates a client for `base_url` (e.g. `https://slack.com/api/`).
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> TransportResult<Self> {
        Self::with_timeout(base_url, token, DEFAULT_TIMEOUT)
    }

    /// Creates with custom timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> TransportResult<Self> {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self {
            client: build_client(timeout)?,
            base_url,
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, url: &str, payload: &Value) -> ApiResult<ApiReply> {
        trace!(url, "POST");
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await
            .map_err(|e| TransportError::Io(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError::Io(e.to_string()))?;
        debug!(url, status, "Web API replied");
        Ok(ApiReply::new(status, body))
    }
}

#[async_trait]
impl ChatApi for HttpApiClient {
    async fn post(&self, method: &str, payload: &Value) -> ApiResult<ApiReply> {
        let url = format!("{}{}", self.base_url, method);
        self.send(&url, payload).await
    }

    async fn post_url(&self, url: &str, payload: &Value) -> ApiResult<ApiReply> {
        self.send(url, payload).await
    }
}

impl std::fmt::Debug for HttpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

// =============================================================================
// Envelope forwarder
// =============================================================================

/// [`EnvelopeSink`] that POSTs envelope JSON to a remote consumer.
///
/// No retries; redelivery is up to the caller.
#[derive(Clone)]
pub struct HttpEnvelopeSink {
    client: Client,
    url: String,
    token: Option<String>,
}

impl HttpEnvelopeSink {
    pub fn new(url: impl Into<String>, token: Option<String>) -> TransportResult<Self> {
        Ok(Self {
            client: build_client(DEFAULT_TIMEOUT)?,
            url: url.into(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl EnvelopeSink for HttpEnvelopeSink {
    async fn enqueue(&self, envelope: Envelope) -> TransportResult<()> {
        let body = envelope
            .to_json()
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;

        let mut req = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| TransportError::Io(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(TransportError::SendFailed(format!(
                "HTTP {} error: {}",
                status.as_u16(),
                text
            )));
        }

        debug!(url = %self.url, endpoint = %envelope.endpoint, "Envelope forwarded");
        Ok(())
    }
}

impl std::fmt::Debug for HttpEnvelopeSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEnvelopeSink")
            .field("url", &self.url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = HttpApiClient::new("https://slack.com/api", "xoxb-test").unwrap();
        assert_eq!(client.base_url(), "https://slack.com/api/");
    }

    #[test]
    fn test_empty_sink_token_is_dropped() {
        let sink = HttpEnvelopeSink::new("http://127.0.0.1:1/queue", Some(String::new())).unwrap();
        assert!(sink.token.is_none());
        assert_eq!(sink.url(), "http://127.0.0.1:1/queue");
    }

    #[tokio::test]
    async fn test_unreachable_sink_reports_io_error() {
        let sink = HttpEnvelopeSink::new("http://127.0.0.1:1/queue", None).unwrap();
        let envelope = Envelope::new("{}", "slack", "spaceport", spaceport_core::Endpoint::Events);
        assert!(matches!(
            sink.enqueue(envelope).await,
            Err(TransportError::Io(_))
        ));
    }
}
