//! Sample handlers.
//!
//! The loggers and the `/sample` acknowledgement need nothing but the event,
//! so they are declared statically. The handlers that call the Web API are
//! built in `main` around a clone of the runtime's client.

use std::sync::{Arc, OnceLock};

use serde_json::{Value, json};
use spaceport::core::{ApiError, Category};
use spaceport::prelude::*;
use spaceport::slack::blockkit::{TextKind, con_text, sec_fields, sec_text};
use tracing::debug;

pub const SAMPLE_COMMAND: &str = "/sample";

// ============================================================================
// Static handlers
// ============================================================================

async fn log_event(event: Arc<NormalizedEvent>, _: Control) {
    debug!("[Slack-Event]\n{event}");
}

async fn log_nonslack(event: Arc<NormalizedEvent>, _: Control) {
    debug!("[Non-Slack]\n{event}");
}

async fn log_command(event: Arc<NormalizedEvent>, _: Control) {
    debug!("[Slack-Command]\n{event}");
}

async fn acknowledge_sample(event: Arc<NormalizedEvent>, _: Control) -> Value {
    json!({
        "response_type": "in_channel",
        "text": format!("_Working on `{}`..._", event.get_str("command").unwrap_or_default()),
    })
}

register_handler!(Event, "DEBUG", log_event);
register_handler!(NonSlack, "DEBUG", log_nonslack);
register_handler!(CommandResponse, "/sample", acknowledge_sample);
register_handler!(Command, "DEBUG", log_command);

// ============================================================================
// Web API handlers
// ============================================================================

/// Handler counts, filled in once the registry is complete.
pub type HandlerCounts = Arc<OnceLock<Vec<(Category, usize)>>>;

/// Answers an app mention containing a word starting with "diag" with the
/// handler counts and component versions.
pub async fn diagnostics(
    event: Arc<NormalizedEvent>,
    control: Control,
    web: SlackWeb,
    counts: HandlerCounts,
) -> Result<(), ApiError> {
    let Some(inner) = event.get("event") else {
        return Ok(());
    };
    let is_mention = inner.get("type").and_then(Value::as_str) == Some("app_mention");
    let text = inner.get("text").and_then(Value::as_str).unwrap_or_default();
    if !is_mention || !mentions_diag(text) {
        return Ok(());
    }
    control.stop();

    let handler_fields: Vec<String> = counts
        .get()
        .map(|counts| {
            counts
                .iter()
                .map(|(category, count)| format!("*{category}*\n{count}"))
                .collect()
        })
        .unwrap_or_default();
    let version_fields = [
        format!("*spaceport*\n{}", env!("CARGO_PKG_VERSION")),
        format!("*{}*\n{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
    ];
    let blocks = json!([
        sec_text("Handler Count", TextKind::Mrkdwn),
        sec_fields(&handler_fields, TextKind::Mrkdwn),
        sec_text("Software Versions", TextKind::Mrkdwn),
        sec_fields(&version_fields, TextKind::Mrkdwn),
    ]);

    let channel = inner.get("channel").and_then(Value::as_str).unwrap_or_default();
    web.chat_post_message(channel, Some("Diagnostics"), Some(blocks), None)
        .await?;
    Ok(())
}

/// Runs `/sample` in the channel it was invoked from.
pub async fn sample_command(
    event: Arc<NormalizedEvent>,
    control: Control,
    web: SlackWeb,
) -> Result<(), ApiError> {
    if event.get_str("command") != Some(SAMPLE_COMMAND) {
        return Ok(());
    }
    control.stop();

    let text = "`S A M P L E` I did it!";
    let blocks = json!([
        sec_text(text, TextKind::Mrkdwn),
        con_text("By: Spaceport sampler", TextKind::Mrkdwn),
    ]);
    let channel = event.get_str("channel_id").unwrap_or_default();
    web.chat_post_message(channel, Some(text), Some(blocks), None)
        .await?;
    Ok(())
}

/// Case-insensitive match of "diag" at the start of a word.
fn mentions_diag(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.match_indices("diag").any(|(at, _)| {
        lower[..at]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'))
    })
}
