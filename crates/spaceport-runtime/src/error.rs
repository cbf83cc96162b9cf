//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration failed to load or did not pass the pre-flight check.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A handler definition was rejected at import.
    #[error("Registry error: {0}")]
    Registry(#[from] spaceport_framework::RegistryError),

    /// A transport could not be created or bound.
    #[error("Transport error: {0}")]
    Transport(#[from] spaceport_core::TransportError),

    /// `run` was called while the runtime was already running.
    #[error("Runtime is already running")]
    AlreadyRunning,
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
