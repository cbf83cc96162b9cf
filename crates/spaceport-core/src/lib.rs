//! # Spaceport Core
//!
//! Foundation types for the Spaceport webhook ingress engine.
//!
//! ## Contents
//!
//! - **Events**: the immutable decoded body handed to handlers ([`NormalizedEvent`])
//! - **Categories**: the closed handler category set and webhook routes
//!   ([`Category`], [`ChainCategory`], [`Endpoint`])
//! - **Envelope Codec**: the message crossing the asynchronous boundary ([`Envelope`])
//! - **Ingress types**: what transports hand in and get back
//!   ([`TransportEvent`], [`WebhookRequest`], [`IngressResponse`])
//! - **Capabilities**: queue and chat API contracts ([`EnvelopeSink`],
//!   [`EnvelopeSource`], [`ChatApi`])
//!
//! ## Flow
//!
//! ```text
//! ┌───────────┐     ┌──────────────┐     ┌────────────┐     ┌──────────┐
//! │ Transport │────▶│ IngressRouter│────▶│ Dispatcher │────▶│ Handlers │
//! └───────────┘     └──────┬───────┘     └────────────┘     └──────────┘
//!                          │ Envelope
//!                          ▼
//!                   ┌──────────────┐
//!                   │ EnvelopeSink │ ─ ─ ▶ consumer side IngressRouter
//!                   └──────────────┘
//! ```

pub mod capability;
pub mod category;
pub mod envelope;
pub mod error;
pub mod event;
pub mod ingress;

pub use capability::{
    ApiReply, BoxedChatApi, BoxedEnvelopeSink, ChatApi, EnvelopeSink, EnvelopeSource,
};
pub use category::{Category, ChainCategory, Endpoint};
pub use envelope::{DecodedEnvelope, Envelope, PLATFORM_SOURCE};
pub use error::{
    ApiError, ApiResult, EnvelopeError, EnvelopeResult, EventError, RouteError, TransportError,
    TransportResult,
};
pub use event::NormalizedEvent;
pub use ingress::{IngressResponse, TransportEvent, WebhookRequest};

/// Prelude for common imports.
pub mod prelude {
    pub use super::category::{Category, ChainCategory, Endpoint};
    pub use super::envelope::Envelope;
    pub use super::event::NormalizedEvent;
    pub use super::ingress::{IngressResponse, TransportEvent, WebhookRequest};
}
