//! Error types for the Spaceport framework.

use serde_json::Value;
use thiserror::Error;

use spaceport_core::Category;

/// Errors raised while populating the handler registry.
///
/// These are programmer errors and surface at startup, never per request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A keyed category was registered without a key.
    #[error("{category} handlers require a non-empty key")]
    MissingKey {
        /// The category that needs a key.
        category: Category,
    },

    /// A keyed category already has a handler for this key.
    #[error("duplicate {category} handler for key '{key}'")]
    DuplicateKey {
        /// The category being registered.
        category: Category,
        /// The clashing key.
        key: String,
    },
}

/// A failure inside one handler invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The handler returned an error.
    #[error("handler failed: {0}")]
    Failed(String),

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// What one handler invocation produces: an optional reply or a failure.
pub type HandlerResult = Result<Option<Value>, HandlerError>;
