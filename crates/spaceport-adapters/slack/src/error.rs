//! Request validation errors.

use thiserror::Error;

/// Why an inbound request was refused.
///
/// Every variant maps to the same outward "unauthorized" result; the detail
/// only reaches the logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The request timestamp header is absent.
    #[error("missing request timestamp")]
    MissingTimestamp,

    /// The timestamp is outside the replay window or not a number.
    #[error("request timestamp outside the replay window")]
    StaleRequest,

    /// The signature header is absent, malformed or does not match.
    #[error("invalid request signature")]
    BadSignature,

    /// The signed body could not be decoded into an event.
    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

/// Result type for request validation.
pub type ValidationResult<T> = Result<T, ValidationError>;
