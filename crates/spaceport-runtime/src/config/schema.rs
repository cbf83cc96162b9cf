//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SpaceportConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Platform credentials and API settings.
    #[serde(default)]
    pub slack: SlackConfig,

    /// Inbound HTTP server.
    #[serde(default)]
    pub server: ServerConfig,

    /// Asynchronous boundary.
    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default)]
    pub commands: CommandsConfig,
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
///
/// Parsed case-insensitively, so `DEBUG`, `debug` and `Debug` are all accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, ConfigError> {
        value.parse()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    #[cfg(feature = "json-log")]
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Required when `output` is `file`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    #[serde(default = "default_max_files")]
    pub max_files: u32,

    /// Per-module levels, e.g. `spaceport_transport = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    #[serde(default)]
    pub thread_ids: bool,

    /// Include file and line of each log call.
    #[serde(default)]
    pub file_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
            max_file_size: default_max_file_size(),
            max_files: default_max_files(),
            filters: HashMap::new(),
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
        }
    }
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_max_files() -> u32 {
    5
}

// =============================================================================
// Slack
// =============================================================================

/// Platform credentials and Web API settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Key for request signature verification.
    #[serde(default)]
    pub signing_secret: String,

    /// Bearer token for the Web API.
    #[serde(default)]
    pub bot_access_token: String,

    /// Channel receiving `post_log` messages.
    #[serde(default)]
    pub log_channel_id: Option<String>,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Maximum clock distance of a request timestamp.
    #[serde(default = "default_replay_window_secs")]
    pub replay_window_secs: u64,
}

impl SlackConfig {
    pub fn replay_window(&self) -> Duration {
        Duration::from_secs(self.replay_window_secs)
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            signing_secret: String::new(),
            bot_access_token: String::new(),
            log_channel_id: None,
            api_base_url: default_api_base_url(),
            replay_window_secs: default_replay_window_secs(),
        }
    }
}

impl fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackConfig")
            .field("signing_secret", &redact(&self.signing_secret))
            .field("bot_access_token", &redact(&self.bot_access_token))
            .field("log_channel_id", &self.log_channel_id)
            .field("api_base_url", &self.api_base_url)
            .field("replay_window_secs", &self.replay_window_secs)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "<unset>" } else { "<redacted>" }
}

fn default_api_base_url() -> String {
    spaceport_adapter_slack::DEFAULT_API_BASE_URL.to_string()
}

fn default_replay_window_secs() -> u64 {
    300
}

// =============================================================================
// Server
// =============================================================================

/// Inbound HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Synchronous acknowledgment deadline in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Path accepting forwarded envelopes.
    #[serde(default = "default_queue_path")]
    pub queue_path: String,

    /// Whether `queue_path` is served at all.
    #[serde(default)]
    pub accept_envelopes: bool,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_ms: default_request_timeout_ms(),
            queue_path: default_queue_path(),
            accept_envelopes: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout_ms() -> u64 {
    3000
}

fn default_queue_path() -> String {
    "/queue".to_string()
}

// =============================================================================
// Queue
// =============================================================================

/// How envelopes cross the asynchronous boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueMode {
    /// In-process bounded channel drained by a consumer task.
    #[default]
    Local,
    /// POSTed to a remote consumer.
    Http,
}

/// Asynchronous boundary configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    #[serde(default)]
    pub mode: QueueMode,

    /// Local channel capacity.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Consumer endpoint for `http` mode.
    #[serde(default)]
    pub url: Option<String>,

    /// Bearer token sent with, and required on, forwarded envelopes.
    #[serde(default)]
    pub token: Option<String>,

    /// Origin tag written on produced envelopes.
    #[serde(default = "default_source")]
    pub source: String,

    /// Target tag written on produced envelopes.
    #[serde(default = "default_destination")]
    pub destination: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            mode: QueueMode::default(),
            capacity: default_capacity(),
            url: None,
            token: None,
            source: default_source(),
            destination: default_destination(),
        }
    }
}

fn default_capacity() -> usize {
    1024
}

fn default_source() -> String {
    spaceport_core::PLATFORM_SOURCE.to_string()
}

fn default_destination() -> String {
    "spaceport".to_string()
}

// =============================================================================
// Commands
// =============================================================================

/// Slash command behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandsConfig {
    /// Acknowledge commands without a `command_response` handler by echoing
    /// them back ephemerally.
    #[serde(default)]
    pub echo_unhandled: bool,
}
