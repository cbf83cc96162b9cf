//! HTTP transports.
//!
//! This module provides HTTP client and server implementations.

#[cfg(feature = "http-client")]
mod client;
#[cfg(feature = "http-client")]
pub use client::{HttpApiClient, HttpEnvelopeSink};

#[cfg(feature = "http-server")]
mod server;
#[cfg(feature = "http-server")]
pub use server::{
    DEFAULT_REQUEST_TIMEOUT, HttpServerConfig, IngressService, ListenerHandle, listen, router,
};
