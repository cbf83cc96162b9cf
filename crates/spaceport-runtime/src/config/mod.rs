//! Configuration module for the Spaceport runtime.
//!
//! Layered TOML/YAML/environment loading and the pre-flight validation the
//! runtime performs before accepting requests.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    CommandsConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, QueueConfig, QueueMode,
    ServerConfig, SlackConfig, SpaceportConfig, SpanEventConfig,
};
pub use validation::validate_config;
