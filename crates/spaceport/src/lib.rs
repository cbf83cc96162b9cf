//! # Spaceport
//!
//! Signed chat-platform webhooks in, ordered handler chains out.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────────────── IngressRouter ───────────────────────┐
//! webhook ──────▶ │ authenticate ─▶ endpoint ─▶ sync reply (command_response)    │──▶ 200/JSON
//!                 │                         └─▶ Envelope ─▶ queue                │
//! queue ────────▶ │ Envelope ─▶ event / command / action chain                   │
//! other ────────▶ │ nonslack chain                                               │
//!                 └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **Runtime**: configuration, logging, HTTP server, queue consumer
//! - **Router**: classifies transport events and drives the flow above
//! - **Registry**: handlers per category, chains in registration order
//! - **Dispatcher**: runs a chain until a handler stops it; a failing handler
//!   contributes an apology instead of aborting the chain
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spaceport::prelude::*;
//!
//! async fn ack(event: Arc<NormalizedEvent>, _: Control) -> String {
//!     format!("Working on `{}`...", event.get_str("command").unwrap_or_default())
//! }
//!
//! register_handler!(CommandResponse, "/deploy", ack);
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = SpaceportRuntime::builder().build()?;
//!     runtime.run(Registry::import()?).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` (default) / `yaml-config`: configuration file formats
//! - `http-server` (default): axum ingress server
//! - `http-client` (default): Web API client and envelope forwarder
//! - `json-log`: JSON log lines

pub use spaceport_adapter_slack as slack;
pub use spaceport_core as core;
pub use spaceport_framework as framework;
pub use spaceport_runtime as runtime;
pub use spaceport_transport as transport;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use spaceport::prelude::*;
/// ```
pub mod prelude {
    pub use std::sync::Arc;

    // Runtime - main entry point
    pub use spaceport_runtime::{IngressRouter, SpaceportConfig, SpaceportRuntime};

    // Handler model
    pub use spaceport_framework::{
        Control, Dispatcher, Handler, HandlerError, IntoReply, Registry, register_handler,
    };

    // Event and routing types
    pub use spaceport_core::{
        Category, ChainCategory, Endpoint, Envelope, IngressResponse, NormalizedEvent,
        TransportEvent,
    };

    // Platform helpers for handlers
    pub use spaceport_adapter_slack::SlackWeb;
    pub use spaceport_adapter_slack::blockkit;
}
