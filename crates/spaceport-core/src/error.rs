//! Unified error types for the Spaceport core.
//!
//! This module provides the error types shared across crates: event decoding,
//! envelope encoding, queue transport, chat API calls and route resolution.
//! Authentication errors live in the Slack adapter and registry/handler errors
//! in `spaceport-framework`.

use thiserror::Error;

use crate::category::Endpoint;

// =============================================================================
// Event Errors
// =============================================================================

/// Errors raised while turning a decoded body into a [`NormalizedEvent`].
///
/// [`NormalizedEvent`]: crate::NormalizedEvent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// The body is not valid JSON.
    #[error("body is not valid JSON: {0}")]
    InvalidJson(String),

    /// The body is valid JSON but not an object.
    #[error("body must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

// =============================================================================
// Envelope Errors
// =============================================================================

/// Errors that can occur while encoding or decoding an [`Envelope`].
///
/// [`Envelope`]: crate::Envelope
#[derive(Debug, Clone, Error)]
pub enum EnvelopeError {
    /// The envelope or its event could not be serialized.
    #[error("failed to serialize envelope: {0}")]
    Serialize(String),

    /// The transport payload is not a well-formed envelope.
    #[error("failed to deserialize envelope: {0}")]
    Deserialize(String),

    /// The envelope body does not hold a valid event.
    #[error("envelope body is not a valid event: {0}")]
    Body(#[from] EventError),
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors that can occur while handing an envelope to the asynchronous side.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The queue has no room for another envelope.
    #[error("queue is full")]
    QueueFull,

    /// The receiving side of the queue is gone.
    #[error("queue is closed")]
    Closed,

    /// An envelope endpoint was configured without a bearer token.
    #[error("envelope path {path} requires a bearer token")]
    MissingToken { path: String },

    /// The remote consumer rejected the envelope.
    #[error("envelope delivery failed: {0}")]
    SendFailed(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Transport not compiled in or not configured.
    #[error("transport '{transport}' not available")]
    NotAvailable {
        /// The transport that is missing.
        transport: &'static str,
    },
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// API Errors
// =============================================================================

/// Error type for outbound chat platform API calls.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The HTTP call returned a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response text or reason.
        message: String,
    },

    /// The platform answered with `ok: false`.
    #[error("platform error: {0}")]
    Platform(String),

    /// A message needs either blocks or text.
    #[error("message has neither text nor blocks")]
    MissingContent,

    /// Failed to serialize/deserialize.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Transport error.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =============================================================================
// Route Errors
// =============================================================================

/// Errors raised while resolving a transport route to an [`Endpoint`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The route is not one of the fixed endpoints.
    #[error("unknown route: {0}")]
    UnknownRoute(String),

    /// The endpoint has no asynchronous handling.
    #[error("endpoint {0} cannot be processed asynchronously")]
    UnsupportedAsyncRoute(Endpoint),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for envelope operations.
pub type EnvelopeResult<T> = Result<T, EnvelopeError>;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
