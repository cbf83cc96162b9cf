//! # Spaceport Adapter for Slack
//!
//! Everything Slack-specific lives here:
//!
//! - [`RequestAuthenticator`]: timestamp and `v0` HMAC signature checks plus
//!   body decoding into a [`NormalizedEvent`](spaceport_core::NormalizedEvent)
//! - [`SlackWeb`]: the Web API methods handlers call
//! - [`blockkit`] and [`text`]: message building and markup helpers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spaceport_adapter_slack::RequestAuthenticator;
//!
//! let auth = RequestAuthenticator::new(signing_secret);
//! match auth.validate(&request) {
//!     Ok(validated) => dispatch(validated.event),
//!     Err(reason) => tracing::warn!(%reason, "Rejected request"),
//! }
//! ```

pub mod auth;
pub mod blockkit;
pub mod body;
pub mod error;
pub mod text;
pub mod web;

pub use auth::{
    CONTENT_TYPE_HEADER, DEFAULT_REPLAY_WINDOW, RequestAuthenticator, SIGNATURE_HEADER,
    TIMESTAMP_HEADER, ValidatedRequest, sign,
};
pub use body::{BodyFormat, decode_body, interaction_payload};
pub use error::{ValidationError, ValidationResult};
pub use web::{DEFAULT_API_BASE_URL, SlackWeb};
