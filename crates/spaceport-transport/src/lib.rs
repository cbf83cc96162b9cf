//! # Spaceport Transport
//!
//! Network implementations of the capabilities defined in `spaceport-core`.
//!
//! ## Features
//!
//! - `http-server`: axum ingress server for webhooks, warm-up pings and
//!   forwarded envelopes
//! - `http-client`: reqwest Web API client and envelope forwarder
//! - `full`: both
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  IngressRouter       │  (spaceport-runtime, a tower::Service)
//! ├──────────────────────┤
//! │  spaceport-core      │  (TransportEvent, EnvelopeSink, ChatApi)
//! ├──────────────────────┤
//! │  spaceport-transport │  <- This crate (implementations)
//! ├──────────────────────┤
//! │  Network (TCP/HTTP)  │
//! └──────────────────────┘
//! ```

// Transport implementations (feature-gated)
#[cfg(any(feature = "http-client", feature = "http-server"))]
pub mod http;

#[cfg(feature = "http-server")]
pub use http::{
    DEFAULT_REQUEST_TIMEOUT, HttpServerConfig, IngressService, ListenerHandle, listen, router,
};

#[cfg(feature = "http-client")]
pub use http::{HttpApiClient, HttpEnvelopeSink};
