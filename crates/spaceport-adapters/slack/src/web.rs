//! Slack Web API wrapper.
//!
//! [`SlackWeb`] builds method payloads and interprets replies; the HTTP call
//! itself goes through the [`ChatApi`] capability so handlers can be tested
//! without a network.

use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use spaceport_core::{ApiError, ApiReply, ApiResult, BoxedChatApi};

/// Default Web API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://slack.com/api/";

/// Typed access to the Web API methods handlers need.
#[derive(Clone)]
pub struct SlackWeb {
    api: BoxedChatApi,
    log_channel_id: Option<String>,
}

impl SlackWeb {
    pub fn new(api: BoxedChatApi) -> Self {
        Self {
            api,
            log_channel_id: None,
        }
    }

    /// Sets the channel [`post_log`](Self::post_log) writes to.
    pub fn with_log_channel(mut self, channel_id: Option<String>) -> Self {
        self.log_channel_id = channel_id.filter(|c| !c.is_empty());
        self
    }

    pub fn log_channel_id(&self) -> Option<&str> {
        self.log_channel_id.as_deref()
    }

    /// `chat.postMessage`. Text is required when there are no blocks and
    /// serves as the notification fallback otherwise.
    pub async fn chat_post_message(
        &self,
        channel: &str,
        text: Option<&str>,
        blocks: Option<Value>,
        thread_ts: Option<&str>,
    ) -> ApiResult<Value> {
        let mut data = Map::new();
        data.insert("channel".into(), json!(channel));
        match (blocks, text) {
            (Some(blocks), text) => {
                data.insert("blocks".into(), blocks);
                if let Some(text) = text {
                    data.insert("text".into(), json!(text));
                }
            }
            (None, Some(text)) => {
                data.insert("text".into(), json!(text));
            }
            (None, None) => return Err(ApiError::MissingContent),
        }
        if let Some(ts) = thread_ts {
            data.insert("thread_ts".into(), json!(ts));
        }
        self.call("chat.postMessage", Value::Object(data)).await
    }

    /// `chat.meMessage`.
    pub async fn chat_me_message(&self, channel: &str, text: &str) -> ApiResult<Value> {
        self.call("chat.meMessage", json!({ "channel": channel, "text": text }))
            .await
    }

    /// `views.open`.
    pub async fn views_open(&self, trigger_id: &str, view: Value) -> ApiResult<Value> {
        self.call("views.open", json!({ "trigger_id": trigger_id, "view": view }))
            .await
    }

    /// `views.update`. `hash` guards against overwriting a newer view.
    pub async fn views_update(
        &self,
        view_id: &str,
        view: Value,
        hash: Option<&str>,
    ) -> ApiResult<Value> {
        let mut data = json!({ "view_id": view_id, "view": view });
        if let Some(hash) = hash {
            data["hash"] = json!(hash);
        }
        self.call("views.update", data).await
    }

    /// `views.push`.
    pub async fn views_push(&self, trigger_id: &str, view: Value) -> ApiResult<Value> {
        self.call("views.push", json!({ "trigger_id": trigger_id, "view": view }))
            .await
    }

    /// Replies through an interaction's `response_url`.
    pub async fn post_response_url(&self, url: &str, payload: &Value) -> ApiResult<Value> {
        let reply = self.api.post_url(url, payload).await?;
        interpret(reply)
    }

    /// Posts to the configured log channel.
    ///
    /// Returns `Ok(None)` when no log channel is set or there is nothing to
    /// post.
    pub async fn post_log(
        &self,
        text: Option<&str>,
        blocks: Option<Value>,
    ) -> ApiResult<Option<Value>> {
        let Some(channel) = self.log_channel_id.as_deref() else {
            debug!("No log channel configured, skipping");
            return Ok(None);
        };
        if text.is_none() && blocks.is_none() {
            return Ok(None);
        }
        self.chat_post_message(channel, text, blocks, None)
            .await
            .map(Some)
    }

    async fn call(&self, method: &str, payload: Value) -> ApiResult<Value> {
        let reply = self.api.post(method, &payload).await?;
        interpret(reply).inspect_err(|e| warn!(method, error = %e, "Web API call failed"))
    }
}

impl std::fmt::Debug for SlackWeb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackWeb")
            .field("log_channel_id", &self.log_channel_id)
            .finish()
    }
}

/// Maps a raw reply to a result.
///
/// Non-2xx is an HTTP error and `"ok": false` a platform error. A body that is
/// not JSON is handed back as `{"body": "<raw>"}`.
fn interpret(reply: ApiReply) -> ApiResult<Value> {
    if !reply.is_success() {
        return Err(ApiError::Http {
            status: reply.status,
            message: reply.body,
        });
    }

    match serde_json::from_str::<Value>(&reply.body) {
        Ok(value) => {
            if value.get("ok") == Some(&Value::Bool(false)) {
                if let Some(metadata) = value.get("response_metadata") {
                    debug!(%metadata, "Platform error metadata");
                }
                let error = value
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown_error");
                return Err(ApiError::Platform(error.to_string()));
            }
            Ok(value)
        }
        Err(_) => Ok(json!({ "body": reply.body })),
    }
}
