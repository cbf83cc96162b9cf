//! Configuration validation utilities.
//!
//! [`validate_config`] is the pre-flight check: the runtime refuses to start
//! on any error it returns.

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, QueueConfig, QueueMode, ServerConfig, SlackConfig, SpaceportConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &SpaceportConfig) -> ConfigResult<()> {
    validate_slack_config(&config.slack)?;
    validate_server_config(&config.server)?;
    validate_queue_config(&config.queue)?;

    // Forwarded envelopes are dispatched without a signature check
    if config.server.accept_envelopes
        && config
            .queue
            .token
            .as_deref()
            .is_none_or(|token| token.trim().is_empty())
    {
        return Err(ConfigError::missing_field("queue.token"));
    }

    if config.logging.output == LogOutput::File && config.logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    Ok(())
}

/// Both credentials must be present before any request is accepted.
fn validate_slack_config(slack: &SlackConfig) -> ConfigResult<()> {
    if slack.signing_secret.trim().is_empty() {
        return Err(ConfigError::missing_field("slack.signing_secret"));
    }

    if slack.bot_access_token.trim().is_empty() {
        return Err(ConfigError::missing_field("slack.bot_access_token"));
    }

    if slack.replay_window_secs == 0 {
        return Err(ConfigError::validation(
            "Replay window must be greater than 0",
        ));
    }

    validate_url(&slack.api_base_url)?;

    Ok(())
}

fn validate_server_config(server: &ServerConfig) -> ConfigResult<()> {
    validate_port(server.port)?;

    if server.request_timeout_ms == 0 {
        return Err(ConfigError::validation(
            "Request timeout must be greater than 0",
        ));
    }

    if server.accept_envelopes {
        validate_path(&server.queue_path)?;
    }

    Ok(())
}

fn validate_queue_config(queue: &QueueConfig) -> ConfigResult<()> {
    if queue.capacity == 0 {
        return Err(ConfigError::validation(
            "Queue capacity must be greater than 0",
        ));
    }

    if queue.source.is_empty() {
        return Err(ConfigError::missing_field("queue.source"));
    }

    if queue.destination.is_empty() {
        return Err(ConfigError::missing_field("queue.destination"));
    }

    if queue.mode == QueueMode::Http {
        match queue.url.as_deref() {
            Some(url) => validate_url(url)?,
            None => return Err(ConfigError::missing_field("queue.url")),
        }
    }

    Ok(())
}

/// Validates an HTTP(S) URL.
fn validate_url(url: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::missing_field("url"));
    }

    let valid_schemes = ["http://", "https://"];
    if !valid_schemes.iter().any(|s| url.starts_with(s)) {
        return Err(ConfigError::invalid_url(
            url,
            format!("URL must start with one of: {:?}", valid_schemes),
        ));
    }

    Ok(())
}

/// Validates a port number.
fn validate_port(port: u16) -> ConfigResult<()> {
    if port == 0 {
        return Err(ConfigError::InvalidPort(port));
    }
    Ok(())
}

/// Validates a path.
fn validate_path(path: &str) -> ConfigResult<()> {
    if !path.starts_with('/') {
        return Err(ConfigError::validation("Path must start with '/'"));
    }
    Ok(())
}
