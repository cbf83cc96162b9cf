//! Capabilities the core consumes without implementing.
//!
//! The asynchronous boundary is reduced to an enqueue/dequeue pair and the
//! outbound chat API to a single "post JSON" call. Concrete implementations
//! live in `spaceport-runtime` (in-process queue) and `spaceport-transport`
//! (HTTP).

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::envelope::Envelope;
use crate::error::{ApiResult, TransportResult};

// =============================================================================
// Queue Boundary
// =============================================================================

/// Producing side of the asynchronous boundary.
#[async_trait]
pub trait EnvelopeSink: Send + Sync {
    /// Hands an envelope to the transport. Delivery is the transport's job.
    async fn enqueue(&self, envelope: Envelope) -> TransportResult<()>;
}

/// Consuming side of the asynchronous boundary.
#[async_trait]
pub trait EnvelopeSource: Send {
    /// Waits for the next envelope. `None` once the transport is closed.
    async fn dequeue(&mut self) -> Option<Envelope>;
}

/// Type-erased sink shared by the router.
pub type BoxedEnvelopeSink = Arc<dyn EnvelopeSink>;

// =============================================================================
// Chat API
// =============================================================================

/// A raw reply from the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply {
    pub status: u16,
    pub body: String,
}

impl ApiReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound "send message" capability.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Calls a Web API method such as `chat.postMessage` with a JSON payload.
    async fn post(&self, method: &str, payload: &Value) -> ApiResult<ApiReply>;

    /// Posts a JSON payload to an absolute URL such as a `response_url`.
    async fn post_url(&self, url: &str, payload: &Value) -> ApiResult<ApiReply>;
}

/// Type-erased chat API client.
pub type BoxedChatApi = Arc<dyn ChatApi>;
